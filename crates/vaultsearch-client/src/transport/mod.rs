//! HTTP transport for the backend contract.
//!
//! Provides the `Transport` seam the session and store are built against,
//! and `ApiClient`, the reqwest implementation of it.

mod client;
mod error;
mod types;

pub use client::{ApiClient, Transport};
pub use error::{TransportError, TransportResult};
pub use types::{ByteStream, ChatRequest, DocumentListResponse, DocumentUpload};
