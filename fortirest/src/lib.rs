//! # Fortirest
//!
//! Async REST client for FortiOS (FortiGate) firewall management.
//!
//! Fortirest exposes the device's management API — the CMDB configuration
//! database, the monitor, log, and service namespaces — as generic,
//! path-addressed operations over a shared HTTPS client, similar to
//! Python's fortiosapi and pyFortiAPI libraries.
//!
//! ## Features
//!
//! - API-key (bearer) and username/password session authentication
//! - Generic CMDB CRUD with `exists`/`set`/`move`/`clone`/`purge` helpers
//! - Server-side CMDB transactions behind an RAII guard
//! - Table schema introspection with payload validation
//! - Typed FortiOS error mapping with retryability classification and
//!   opt-in capped-exponential retries
//! - Audit trail fan-out (file, stream, UDP syslog, callback)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fortirest::{FortiClient, Query};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fortirest::Error> {
//!     let mut client = FortiClient::builder("192.168.1.99")
//!         .api_key("p3g1hn5jQw...")
//!         .vdom("root")
//!         .build()?;
//!
//!     client.connect().await?;
//!
//!     let addresses = client.cmdb().list("firewall", "address", &Query::new()).await?;
//!     for addr in &addresses {
//!         println!("{}", addr["name"]);
//!     }
//!
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audit;
pub mod client;
pub mod error;
pub mod retry;
pub mod transport;

// Re-export main types for convenience
pub use api::{
    Cmdb, FieldSchema, FieldType, Filter, FilterOp, Log, LogDevice, Monitor, MovePosition,
    Namespace, ObjectSchema, Query, Scope, Service, ValidationIssue,
};
pub use audit::{
    AuditEvent, AuditSink, CallbackSink, FanoutSink, NoopSink, RotatingFileSink, StreamSink,
    UdpSyslogSink,
};
pub use client::{ApiResponse, ClientBuilder, DeviceInfo, FortiClient, Transaction};
pub use error::{ApiError, ClientError, Error, Result, TransportError};
pub use retry::RetryPolicy;
pub use transport::{AuthMethod, ConnectConfig, TlsVerification};

// HTTP method type used by the raw request API
pub use reqwest::Method;
