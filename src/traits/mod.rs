//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP operations used by the research client
//!   (buffered GET/DELETE, multipart POST and streaming GET)

pub mod http;

pub use http::{ByteStream, FilePart, Headers, HttpClient, HttpError, Response};
