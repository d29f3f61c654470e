//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses, scripted body chunks, mid-stream failures or a stalled body.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, FilePart, Headers, HttpClient, HttpError, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET, POST or DELETE)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// File sent by a multipart POST
    pub file: Option<FilePart>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful buffered response
    Success(Response),
    /// Fail the request before any body is read
    Error(HttpError),
    /// Return a stream yielding these chunks, then end
    Stream(Vec<Bytes>),
    /// Yield these chunks, then fail the read with the error
    StreamThenError(Vec<Bytes>, HttpError),
    /// Yield these chunks, then never produce another item nor close
    Stall(Vec<Bytes>),
}

/// Mock HTTP client for testing.
///
/// Responses are looked up by exact URL, then by URL prefix, then the
/// default response.
///
/// # Example
///
/// ```ignore
/// use localmind::adapters::mock::{MockHttpClient, MockResponse};
/// use bytes::Bytes;
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://localhost:8000/research/stream",
///     MockResponse::Stream(vec![Bytes::from("event: done\ndata: {}\n\n")]),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a response for a URL (exact match, or prefix of the request URL).
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        let mut default = self.default_response.lock().unwrap();
        *default = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers) {
        self.record(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            file: None,
        });
    }

    fn record(&self, request: RecordedRequest) {
        self.requests.lock().unwrap().push(request);
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap();

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }

        let default = self.default_response.lock().unwrap();
        default.clone()
    }

    fn buffered(&self, method: &str, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request(method, url, headers);
        self.buffered_response(url)
    }

    fn buffered_response(&self, url: &str) -> Result<Response, HttpError> {
        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(_) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.buffered("GET", url, headers)
    }

    async fn delete(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.buffered("DELETE", url, headers)
    }

    async fn post_multipart(
        &self,
        url: &str,
        file: FilePart,
        headers: &Headers,
    ) -> Result<Response, HttpError> {
        self.record(RecordedRequest {
            method: "POST".to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            file: Some(file),
        });
        self.buffered_response(url)
    }

    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, HttpError> {
        self.record_request("GET", url, headers);

        match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => {
                let items = chunks.into_iter().map(Ok::<Bytes, HttpError>);
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Some(MockResponse::StreamThenError(chunks, err)) => {
                let items = chunks
                    .into_iter()
                    .map(Ok::<Bytes, HttpError>)
                    .chain(std::iter::once(Err(err)));
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Some(MockResponse::Stall(chunks)) => {
                let stream = futures::stream::iter(chunks.into_iter().map(Ok::<Bytes, HttpError>))
                    .chain(futures::stream::pending());
                Ok(Box::pin(stream))
            }
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::Success(_)) => Err(HttpError::Other(
                "Non-stream response on stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_with_response() {
        let client = MockHttpClient::new();
        client.set_response(
            "http://localhost/health",
            MockResponse::Success(Response::new(200, Bytes::from(r#"{"status":"healthy"}"#))),
        );

        let response = client
            .get("http://localhost/health", &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let requests = client.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "http://localhost/health");
    }

    #[tokio::test]
    async fn test_prefix_match_for_stream() {
        let client = MockHttpClient::new();
        client.set_response(
            "http://localhost/research/stream",
            MockResponse::Stream(vec![Bytes::from("a"), Bytes::from("b")]),
        );

        let mut stream = client
            .get_stream(
                "http://localhost/research/stream?user_input=hi&thread_id=1",
                &Headers::new(),
            )
            .await
            .unwrap();

        let mut chunks = Vec::new();
        while let Some(item) = stream.next().await {
            chunks.push(item.unwrap());
        }
        assert_eq!(chunks, vec![Bytes::from("a"), Bytes::from("b")]);
    }

    #[tokio::test]
    async fn test_stream_then_error() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::StreamThenError(
            vec![Bytes::from("partial")],
            HttpError::Io("reset".to_string()),
        ));

        let mut stream = client
            .get_stream("http://localhost/any", &Headers::new())
            .await
            .unwrap();

        assert_eq!(stream.next().await, Some(Ok(Bytes::from("partial"))));
        assert_eq!(
            stream.next().await,
            Some(Err(HttpError::Io("reset".to_string())))
        );
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn test_delete_records_method() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(200, Bytes::new())));

        client
            .delete("http://localhost/rag/delete/a.pdf", &Headers::new())
            .await
            .unwrap();
        assert_eq!(client.get_requests()[0].method, "DELETE");
    }

    #[tokio::test]
    async fn test_post_multipart_records_file() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(200, Bytes::new())));

        let file = FilePart::new("file", "notes.txt", Bytes::from("hello"));
        client
            .post_multipart("http://localhost/rag/upload/", file.clone(), &Headers::new())
            .await
            .unwrap();

        let requests = client.get_requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].file, Some(file));
    }

    #[tokio::test]
    async fn test_no_response_configured() {
        let client = MockHttpClient::new();
        let result = client.get("http://localhost/missing", &Headers::new()).await;
        assert!(matches!(result, Err(HttpError::Other(_))));
    }
}
