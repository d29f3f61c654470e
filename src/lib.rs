//! Local Mind - streaming client for the Local Mind research server
//!
//! Reads the server's event stream for a query and rebuilds the
//! conversation transcript incrementally: tokens, search/result side
//! events, completion and errors.
//!
//! This library exposes modules for use in integration tests and by the
//! `localmind` binary.

pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod sse;
pub mod state;
pub mod stream;
pub mod traits;
