//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with scripted responses and body chunks

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
