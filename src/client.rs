//! Research server API client.
//!
//! Issues the streaming query request and the small auxiliary calls the
//! server exposes (health, RAG document upload, listing and deletion).

use bytes::Bytes;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::models::{Endpoint, HealthStatus, RagFiles, RagMessage, StreamRequest};
use crate::traits::{ByteStream, FilePart, Headers, HttpClient, HttpError, Response};

/// Error type for research client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Response body was not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Local file to upload could not be read
    #[error("Cannot read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Upload path has no file name component
    #[error("Not a file path: {}", .0.display())]
    InvalidPath(PathBuf),
}

/// Client for the research server.
pub struct ResearchClient<C: HttpClient = ReqwestHttpClient> {
    base_url: String,
    endpoint: Endpoint,
    http: C,
}

impl ResearchClient<ReqwestHttpClient> {
    /// Client backed by reqwest, configured from `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_http(config, ReqwestHttpClient::new())
    }
}

impl<C: HttpClient> ResearchClient<C> {
    /// Client using a custom HTTP implementation.
    pub fn with_http(config: &ClientConfig, http: C) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoint: config.endpoint,
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Full URL of the streaming request for `request`.
    pub fn stream_url(&self, request: &StreamRequest) -> String {
        format!(
            "{}{}?{}",
            self.base_url,
            self.endpoint.stream_path(),
            request.query_string()
        )
    }

    /// Open the event stream for one query.
    ///
    /// Resolves once response headers arrive; the body chunks follow
    /// through the returned stream.
    pub async fn stream(&self, request: &StreamRequest) -> Result<ByteStream, HttpError> {
        let url = self.stream_url(request);
        tracing::debug!("Opening stream: {}", url);

        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        self.http.get_stream(&url, &headers).await
    }

    /// Check if the server reports itself healthy.
    pub async fn health_check(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.http.get(&url, &Headers::new()).await?;
        if !response.is_success() {
            return Ok(false);
        }
        let status: HealthStatus = response.json()?;
        Ok(status.is_healthy())
    }

    /// Upload a local document for retrieval; the server indexes it.
    ///
    /// Returns the server's confirmation message.
    pub async fn upload_rag_file(&self, path: &Path) -> Result<String, ClientError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::InvalidPath(path.to_path_buf()))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::File {
                path: path.to_path_buf(),
                source,
            })?;

        let url = format!("{}/rag/upload/", self.base_url);
        let file = FilePart::new("file", file_name.as_str(), Bytes::from(bytes));
        let response = ensure_success(
            self.http
                .post_multipart(&url, file, &Headers::new())
                .await?,
        )?;
        let body: RagMessage = response.json()?;
        tracing::info!("Uploaded RAG document {}", file_name);
        Ok(body.message)
    }

    /// List documents indexed for retrieval.
    pub async fn list_rag_files(&self) -> Result<Vec<String>, ClientError> {
        let url = format!("{}/rag/files/", self.base_url);
        let response = ensure_success(self.http.get(&url, &Headers::new()).await?)?;
        let files: RagFiles = response.json()?;
        Ok(files.files)
    }

    /// Delete an indexed document; the server re-indexes afterwards.
    pub async fn delete_rag_file(&self, filename: &str) -> Result<(), ClientError> {
        let url = format!(
            "{}/rag/delete/{}",
            self.base_url,
            urlencoding::encode(filename)
        );
        ensure_success(self.http.delete(&url, &Headers::new()).await?)?;
        tracing::info!("Deleted RAG document {}", filename);
        Ok(())
    }
}

fn ensure_success(response: Response) -> Result<Response, ClientError> {
    if response.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<serde_json::Value>()
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .or_else(|| response.text().ok())
        .unwrap_or_else(|| "Unknown error".to_string());
    Err(ClientError::ServerError {
        status: response.status,
        message,
    })
}
