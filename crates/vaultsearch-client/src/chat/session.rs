//! Conversation session state machine.
//!
//! One session owns the transcript and the streaming draft. A submitted
//! question runs the full exchange: append the user message, open the chat
//! stream, accumulate deltas into the draft, and commit the finalized
//! assistant message. At most one chat request is outstanding at a time;
//! submissions while busy are ignored, never queued. Knowledge-base
//! operations are not gated by the session and may run alongside a stream.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

use crate::transport::Transport;

use super::message::{Message, StreamingDraft};
use super::stream::AnswerStream;

/// Fixed marker committed to the transcript when a chat request or its
/// stream fails. Distinguishable from a real answer only by this text.
pub const ANSWER_ERROR_MARKER: &str = "**Error:** the assistant connection failed.";

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Where the session currently is in the exchange lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No chat request outstanding; submissions are accepted.
    Idle,
    /// User message appended and request in flight, no bytes yet.
    Sending,
    /// First delta received; the draft is accumulating.
    Streaming,
    /// Stream ended cleanly; the draft is being promoted.
    Committing,
}

/// What a [`ChatSession::submit`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The exchange ran to completion and an assistant message was committed.
    Answered,
    /// The request or stream failed; an error entry was committed instead.
    Failed,
    /// The session was busy or the question was blank; nothing happened.
    Ignored,
}

/// Notification that a snapshot changed and is worth re-reading.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session moved to a new status.
    StatusChanged(SessionStatus),
    /// The draft grew; carries the full accumulated text.
    DraftUpdated(String),
    /// A message was appended to the transcript.
    MessageCommitted(Message),
}

struct SessionInner {
    transcript: Vec<Message>,
    draft: Option<StreamingDraft>,
    status: SessionStatus,
}

/// The conversation session.
///
/// Exclusive owner of the transcript and draft; observers only ever see
/// cloned snapshots. Shareable across tasks, but never spawns any itself.
pub struct ChatSession {
    transport: Arc<dyn Transport>,
    inner: Mutex<SessionInner>,
    events: broadcast::Sender<SessionEvent>,
}

impl ChatSession {
    /// Create a session over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            transport,
            inner: Mutex::new(SessionInner {
                transcript: Vec::new(),
                draft: None,
                status: SessionStatus::Idle,
            }),
            events,
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the committed transcript, in chronological order.
    pub async fn transcript(&self) -> Vec<Message> {
        self.inner.lock().await.transcript.clone()
    }

    /// Snapshot of the in-progress draft, if a stream is live.
    pub async fn draft(&self) -> Option<StreamingDraft> {
        self.inner.lock().await.draft.clone()
    }

    /// Current lifecycle status.
    pub async fn status(&self) -> SessionStatus {
        self.inner.lock().await.status
    }

    /// Whether a chat request is outstanding.
    pub async fn is_busy(&self) -> bool {
        self.status().await != SessionStatus::Idle
    }

    /// Submit a question and drive the exchange to completion.
    ///
    /// A blank question, or a call while a request is already outstanding,
    /// is ignored: no transcript change and no transport call.
    pub async fn submit(&self, question: &str) -> SubmitOutcome {
        let question = question.trim();
        if question.is_empty() {
            debug!("ignoring blank question");
            return SubmitOutcome::Ignored;
        }

        let user_message = Message::user(question);
        {
            let mut inner = self.inner.lock().await;
            if inner.status != SessionStatus::Idle {
                debug!(status = ?inner.status, "ignoring submission while a request is outstanding");
                return SubmitOutcome::Ignored;
            }
            inner.status = SessionStatus::Sending;
            inner.transcript.push(user_message.clone());
        }
        self.emit(SessionEvent::MessageCommitted(user_message));
        self.emit(SessionEvent::StatusChanged(SessionStatus::Sending));

        let stream = match self.transport.chat(question).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "chat request failed before any bytes arrived");
                self.commit_failure().await;
                return SubmitOutcome::Failed;
            }
        };

        let mut answer = AnswerStream::new(stream);
        loop {
            match answer.next_delta().await {
                Some(Ok(delta)) => {
                    let (snapshot, first_delta) = {
                        let mut inner = self.inner.lock().await;
                        let first_delta = inner.status == SessionStatus::Sending;
                        if first_delta {
                            inner.status = SessionStatus::Streaming;
                        }
                        let draft = inner.draft.get_or_insert_with(StreamingDraft::new);
                        draft.content.push_str(&delta);
                        (draft.content.clone(), first_delta)
                    };
                    if first_delta {
                        self.emit(SessionEvent::StatusChanged(SessionStatus::Streaming));
                    }
                    self.emit(SessionEvent::DraftUpdated(snapshot));
                }
                Some(Err(err)) => {
                    warn!(error = %err, "chat stream failed mid-answer");
                    self.commit_failure().await;
                    return SubmitOutcome::Failed;
                }
                None => break,
            }
        }

        // Clean end of stream; a zero-delta stream still commits an (empty)
        // assistant message rather than leaving the session stuck.
        let message = {
            let mut inner = self.inner.lock().await;
            inner.status = SessionStatus::Committing;
            let content = inner
                .draft
                .take()
                .map(|draft| draft.content)
                .unwrap_or_default();
            let message = Message::assistant(content);
            inner.transcript.push(message.clone());
            inner.status = SessionStatus::Idle;
            message
        };
        debug!(chars = message.content.len(), "committed assistant answer");
        self.emit(SessionEvent::MessageCommitted(message));
        self.emit(SessionEvent::StatusChanged(SessionStatus::Idle));
        SubmitOutcome::Answered
    }

    /// Record a knowledge-base removal in the conversational record.
    /// Called by the store after a successful delete.
    pub(crate) async fn note_document_removed(&self, name: &str) {
        let message = Message::assistant(format!(
            "**System:** removed `{name}` from the knowledge base."
        ));
        {
            let mut inner = self.inner.lock().await;
            inner.transcript.push(message.clone());
        }
        self.emit(SessionEvent::MessageCommitted(message));
    }

    /// Convert an in-flight failure into a visible transcript entry. Text
    /// already delivered is kept; the marker lands as the final paragraph.
    async fn commit_failure(&self) {
        let message = {
            let mut inner = self.inner.lock().await;
            let mut content = inner
                .draft
                .take()
                .map(|draft| draft.content)
                .unwrap_or_default();
            if !content.is_empty() {
                content.push_str("\n\n");
            }
            content.push_str(ANSWER_ERROR_MARKER);
            let message = Message::assistant(content);
            inner.transcript.push(message.clone());
            inner.status = SessionStatus::Idle;
            message
        };
        self.emit(SessionEvent::MessageCommitted(message));
        self.emit(SessionEvent::StatusChanged(SessionStatus::Idle));
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; snapshots can always be re-read.
        let _ = self.events.send(event);
    }
}
