//! Namespace handles for the FortiOS management API.
//!
//! Each handle is a lightweight borrow of the client, addressing one of
//! the top-level API namespaces (`/api/v2/<namespace>/...`).

mod cmdb;
mod log;
mod monitor;
pub mod query;
pub mod schema;
mod service;

pub use cmdb::{Cmdb, MovePosition};
pub use log::{Log, LogDevice};
pub use monitor::Monitor;
pub use query::{Filter, FilterOp, Query, Scope};
pub use schema::{FieldSchema, FieldType, ObjectSchema, ValidationIssue};
pub use service::Service;

/// Top-level namespaces of the FortiOS REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Persistent device configuration (`/api/v2/cmdb`).
    Cmdb,
    /// Runtime state and imperative actions (`/api/v2/monitor`).
    Monitor,
    /// Log access (`/api/v2/log`).
    Log,
    /// Auxiliary service endpoints (`/api/v2/service`).
    Service,
}

impl Namespace {
    /// The URL segment for this namespace.
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Cmdb => "cmdb",
            Namespace::Monitor => "monitor",
            Namespace::Log => "log",
            Namespace::Service => "service",
        }
    }
}
