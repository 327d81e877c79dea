//! Scripted transport for driving the session and store deterministically.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use vaultsearch_client::{ByteStream, DocumentUpload, Transport, TransportError, TransportResult};

/// In-memory stand-in for the backend, replaying scripted chat bodies.
pub struct FakeTransport {
    documents: Mutex<Vec<String>>,
    chat_streams: Mutex<VecDeque<ByteStream>>,
    chat_calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new(documents: &[&str]) -> Self {
        Self {
            documents: Mutex::new(documents.iter().map(|name| name.to_string()).collect()),
            chat_streams: Mutex::new(VecDeque::new()),
            chat_calls: AtomicUsize::new(0),
        }
    }

    /// Queue the response body for the next `chat` call.
    pub fn script_chat_stream(&self, stream: ByteStream) {
        self.chat_streams.lock().unwrap().push_back(stream);
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn list_documents(&self) -> TransportResult<Vec<String>> {
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn upload(&self, document: DocumentUpload) -> TransportResult<()> {
        self.documents.lock().unwrap().push(document.file_name);
        Ok(())
    }

    async fn delete_document(&self, name: &str) -> TransportResult<()> {
        self.documents.lock().unwrap().retain(|doc| doc != name);
        Ok(())
    }

    async fn chat(&self, _question: &str) -> TransportResult<ByteStream> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        match self.chat_streams.lock().unwrap().pop_front() {
            Some(stream) => Ok(stream),
            None => Err(TransportError::Stream(
                "no scripted chat response".to_string(),
            )),
        }
    }
}
