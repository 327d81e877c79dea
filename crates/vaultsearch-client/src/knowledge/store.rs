//! Local mirror of the server-side document listing.

use std::sync::Arc;

use tracing::debug;

use crate::chat::ChatSession;
use crate::transport::{DocumentUpload, Transport, TransportResult};

/// Authoritative local mirror of the indexed document names.
///
/// The listing is refreshed wholesale rather than patched incrementally, so
/// concurrent external mutation cannot make the mirror drift. A failed
/// refresh leaves the previous listing in place: stale-but-present beats
/// empty-and-wrong.
pub struct KnowledgeStore {
    transport: Arc<dyn Transport>,
    documents: Vec<String>,
}

impl KnowledgeStore {
    /// Create an empty store over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            documents: Vec::new(),
        }
    }

    /// The currently known document names, sorted for stable presentation.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Re-fetch the full listing and replace the local set.
    ///
    /// On failure the existing set is left untouched and the error is
    /// returned for display.
    pub async fn refresh(&mut self) -> TransportResult<()> {
        let mut names = self.transport.list_documents().await?;
        names.sort_unstable();
        debug!(count = names.len(), "refreshed document listing");
        self.documents = names;
        Ok(())
    }

    /// Upload a document, then refresh the listing.
    ///
    /// An upload rejection leaves the store untouched; the server decides
    /// about de-duplication and format validity.
    pub async fn upload_and_refresh(&mut self, document: DocumentUpload) -> TransportResult<()> {
        let name = document.file_name.clone();
        self.transport.upload(document).await?;
        debug!(document = %name, "uploaded document");
        self.refresh().await
    }

    /// Delete a document, record the removal in the session transcript, and
    /// refresh the listing.
    ///
    /// The transcript note lands as soon as the delete succeeds; a refresh
    /// failure afterwards still surfaces as this call's error. A failed
    /// delete mutates neither the store nor the transcript.
    pub async fn delete_and_refresh(
        &mut self,
        name: &str,
        session: &ChatSession,
    ) -> TransportResult<()> {
        self.transport.delete_document(name).await?;
        debug!(document = %name, "deleted document");
        session.note_document_removed(name).await;
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ByteStream, TransportError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-memory backend standing in for the document endpoints.
    struct FakeBackend {
        documents: Mutex<Vec<String>>,
        fail_listing: AtomicBool,
        fail_upload: AtomicBool,
        fail_delete: AtomicBool,
    }

    impl FakeBackend {
        fn with_documents(names: &[&str]) -> Self {
            Self {
                documents: Mutex::new(names.iter().map(|name| name.to_string()).collect()),
                fail_listing: AtomicBool::new(false),
                fail_upload: AtomicBool::new(false),
                fail_delete: AtomicBool::new(false),
            }
        }

        fn rejection() -> TransportError {
            TransportError::Server {
                status: 500,
                message: "backend unavailable".to_string(),
            }
        }
    }

    #[async_trait]
    impl Transport for FakeBackend {
        async fn list_documents(&self) -> TransportResult<Vec<String>> {
            if self.fail_listing.load(Ordering::SeqCst) {
                return Err(Self::rejection());
            }
            Ok(self.documents.lock().unwrap().clone())
        }

        async fn upload(&self, document: DocumentUpload) -> TransportResult<()> {
            if self.fail_upload.load(Ordering::SeqCst) {
                return Err(Self::rejection());
            }
            self.documents.lock().unwrap().push(document.file_name);
            Ok(())
        }

        async fn delete_document(&self, name: &str) -> TransportResult<()> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(Self::rejection());
            }
            self.documents.lock().unwrap().retain(|doc| doc != name);
            Ok(())
        }

        async fn chat(&self, _question: &str) -> TransportResult<ByteStream> {
            Err(TransportError::Stream("chat not scripted".to_string()))
        }
    }

    #[tokio::test]
    async fn refresh_replaces_the_listing_sorted() {
        let backend = Arc::new(FakeBackend::with_documents(&["zeta.pdf", "alpha.pdf"]));
        let mut store = KnowledgeStore::new(backend);

        store.refresh().await.unwrap();
        assert_eq!(store.documents(), ["alpha.pdf", "zeta.pdf"]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_previous_listing() {
        let backend = Arc::new(FakeBackend::with_documents(&["alpha.pdf"]));
        let mut store = KnowledgeStore::new(backend.clone());
        store.refresh().await.unwrap();

        backend.fail_listing.store(true, Ordering::SeqCst);
        assert!(store.refresh().await.is_err());
        assert_eq!(store.documents(), ["alpha.pdf"]);
    }

    #[tokio::test]
    async fn refresh_is_idempotent_without_mutation() {
        let backend = Arc::new(FakeBackend::with_documents(&["a.pdf", "b.pdf"]));
        let mut store = KnowledgeStore::new(backend);

        store.refresh().await.unwrap();
        let first = store.documents().to_vec();
        store.refresh().await.unwrap();
        assert_eq!(store.documents(), first);
    }

    #[tokio::test]
    async fn rejected_upload_leaves_the_store_untouched() {
        let backend = Arc::new(FakeBackend::with_documents(&["alpha.pdf"]));
        let mut store = KnowledgeStore::new(backend.clone());
        store.refresh().await.unwrap();

        backend.fail_upload.store(true, Ordering::SeqCst);
        let result = store
            .upload_and_refresh(DocumentUpload::new("new.pdf", b"%PDF-1.4".to_vec()))
            .await;

        assert!(matches!(
            result,
            Err(TransportError::Server { status: 500, .. })
        ));
        assert_eq!(store.documents(), ["alpha.pdf"]);
    }

    #[tokio::test]
    async fn successful_upload_appears_in_the_listing() {
        let backend = Arc::new(FakeBackend::with_documents(&[]));
        let mut store = KnowledgeStore::new(backend);

        store
            .upload_and_refresh(DocumentUpload::new("report.pdf", b"%PDF-1.4".to_vec()))
            .await
            .unwrap();
        assert_eq!(store.documents(), ["report.pdf"]);
    }

    #[tokio::test]
    async fn delete_records_exactly_one_transcript_note() {
        let backend = Arc::new(FakeBackend::with_documents(&["old.pdf", "keep.pdf"]));
        let session = ChatSession::new(backend.clone());
        let mut store = KnowledgeStore::new(backend);
        store.refresh().await.unwrap();

        store.delete_and_refresh("old.pdf", &session).await.unwrap();

        assert_eq!(store.documents(), ["keep.pdf"]);
        let notes: Vec<_> = session
            .transcript()
            .await
            .into_iter()
            .filter(|message| message.content.contains("old.pdf"))
            .collect();
        assert_eq!(notes.len(), 1);
    }

    #[tokio::test]
    async fn failed_delete_mutates_nothing() {
        let backend = Arc::new(FakeBackend::with_documents(&["keep.pdf"]));
        let session = ChatSession::new(backend.clone());
        let mut store = KnowledgeStore::new(backend.clone());
        store.refresh().await.unwrap();

        backend.fail_delete.store(true, Ordering::SeqCst);
        assert!(store.delete_and_refresh("keep.pdf", &session).await.is_err());

        assert_eq!(store.documents(), ["keep.pdf"]);
        assert!(session.transcript().await.is_empty());
    }
}
