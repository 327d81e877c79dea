//! Wire types for the backend HTTP contract.

use std::path::Path;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use super::error::TransportError;

/// Body of a chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub question: String,
}

/// Response shape of the document listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentListResponse {
    #[serde(default)]
    pub documents: Vec<String>,
}

/// A document to be uploaded into the knowledge base.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// File name the server indexes the document under.
    pub file_name: String,
    /// Raw file contents.
    pub content: Vec<u8>,
}

impl DocumentUpload {
    /// Create an upload from in-memory contents.
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    /// Read a document from disk, naming it after the file.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self { file_name, content })
    }
}

/// A live chat answer body: UTF-8 bytes in arbitrary chunks, arrival order.
///
/// Nothing delimits chunk boundaries as meaningful units; concatenating the
/// chunks reconstructs the answer.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_tolerates_missing_documents_field() {
        let listing: DocumentListResponse = serde_json::from_str("{}").unwrap();
        assert!(listing.documents.is_empty());
    }

    #[test]
    fn chat_request_serializes_question_field() {
        let body = serde_json::to_string(&ChatRequest {
            question: "What are the penalties?".to_string(),
        })
        .unwrap();
        assert_eq!(body, r#"{"question":"What are the penalties?"}"#);
    }

    #[tokio::test]
    async fn upload_from_path_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();

        let upload = DocumentUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "report.pdf");
        assert_eq!(upload.content, b"%PDF-1.4");
    }
}
