//! Conversation state machine and streaming answer consumption.

mod message;
mod session;
mod stream;

pub use message::{Message, Role, StreamingDraft};
pub use session::{ANSWER_ERROR_MARKER, ChatSession, SessionEvent, SessionStatus, SubmitOutcome};
pub use stream::AnswerStream;
