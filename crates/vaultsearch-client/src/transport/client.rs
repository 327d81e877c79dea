//! Backend HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, multipart};
use tracing::debug;

use crate::settings::ClientConfig;

use super::error::{TransportError, TransportResult};
use super::types::{ByteStream, ChatRequest, DocumentListResponse, DocumentUpload};

/// The four operations the backend exposes.
///
/// `ApiClient` is the production implementation; tests inject scripted
/// fakes through the same seam.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the full document listing. An empty knowledge base yields an
    /// empty list, not an error.
    async fn list_documents(&self) -> TransportResult<Vec<String>>;

    /// Upload one document. The server is authoritative for de-duplication,
    /// overwrite, and format validation; a rejection for any reason comes
    /// back as a typed failure.
    async fn upload(&self, document: DocumentUpload) -> TransportResult<()>;

    /// Delete a document by name.
    async fn delete_document(&self, name: &str) -> TransportResult<()>;

    /// Ask a question and obtain the live answer body.
    async fn chat(&self, question: &str) -> TransportResult<ByteStream>;
}

/// Client for the backend HTTP API.
///
/// Stateless apart from the connection pool. No retries are attempted here;
/// retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: &ClientConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn into_success(response: Response) -> TransportResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(TransportError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn list_documents(&self) -> TransportResult<Vec<String>> {
        let url = self.url("/documents");
        debug!(%url, "fetching document listing");

        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = Self::into_success(response).await?;

        // Read as text first so a malformed body classifies as a parse
        // failure rather than a network one.
        let body = response.text().await?;
        let listing: DocumentListResponse =
            serde_json::from_str(&body).map_err(|err| TransportError::Parse(err.to_string()))?;
        Ok(listing.documents)
    }

    async fn upload(&self, document: DocumentUpload) -> TransportResult<()> {
        let url = self.url("/upload");
        debug!(%url, document = %document.file_name, "uploading document");

        let part = multipart::Part::bytes(document.content).file_name(document.file_name);
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.request_timeout)
            .send()
            .await?;
        Self::into_success(response).await?;
        Ok(())
    }

    async fn delete_document(&self, name: &str) -> TransportResult<()> {
        let url = self.url(&format!("/documents/{}", urlencoding::encode(name)));
        debug!(%url, "deleting document");

        let response = self
            .client
            .delete(&url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        Self::into_success(response).await?;
        Ok(())
    }

    async fn chat(&self, question: &str) -> TransportResult<ByteStream> {
        let url = self.url("/chat");
        debug!(%url, "sending chat question");

        // No total timeout here: the answer body stays open for as long as
        // generation runs.
        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                question: question.to_string(),
            })
            .send()
            .await?;
        let response = Self::into_success(response).await?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|err| TransportError::Stream(err.to_string())));
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base_url: &str) -> ApiClient {
        ApiClient::new(&ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = client_for("http://localhost:8000/");
        assert_eq!(client.url("/documents"), "http://localhost:8000/documents");
    }

    #[test]
    fn document_names_are_url_encoded() {
        let client = client_for("http://localhost:8000");
        let url = format!(
            "{}/documents/{}",
            client.base_url,
            urlencoding::encode("quarterly report.pdf")
        );
        assert_eq!(
            url,
            "http://localhost:8000/documents/quarterly%20report.pdf"
        );
    }
}
