//! Client library for the VaultSearch document-chat backend.
//!
//! Three cooperating components over one HTTP contract:
//!
//! - [`transport`] — the four backend operations behind the [`Transport`]
//!   seam, with [`ApiClient`] as the reqwest implementation.
//! - [`chat`] — the conversation session state machine and the streaming
//!   answer consumer that reassembles UTF-8 deltas across chunk boundaries.
//! - [`knowledge`] — the local mirror of the server's document listing.
//!
//! The session owns the transcript and draft; the store owns the listing;
//! the view layer only ever reads snapshots and re-reads them after change
//! notifications.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vaultsearch_client::{ApiClient, ChatSession, ClientConfig, KnowledgeStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let transport = Arc::new(ApiClient::new(&config));
//! let session = ChatSession::new(transport.clone());
//! let mut store = KnowledgeStore::new(transport);
//!
//! store.refresh().await?;
//! session.submit("Summarize this document").await;
//! for message in session.transcript().await {
//!     println!("{:?}: {}", message.role, message.content);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod knowledge;
pub mod settings;
pub mod transport;

pub use chat::{
    ANSWER_ERROR_MARKER, AnswerStream, ChatSession, Message, Role, SessionEvent, SessionStatus,
    StreamingDraft, SubmitOutcome,
};
pub use knowledge::KnowledgeStore;
pub use settings::ClientConfig;
pub use transport::{
    ApiClient, ByteStream, DocumentUpload, Transport, TransportError, TransportResult,
};
