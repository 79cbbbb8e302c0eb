//! HTTPS transport for the FortiOS management API.
//!
//! The transport owns the HTTP client and the management session
//! (bearer token or logincheck cookie + CSRF token). Everything above
//! it works in terms of API paths and envelopes.

pub mod config;
mod http;

pub use config::{AuthMethod, ConnectConfig, TlsVerification};
pub use http::HttpTransport;
