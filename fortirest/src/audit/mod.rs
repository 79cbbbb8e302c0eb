//! Audit trail for API requests.
//!
//! When a sink is attached via [`ClientBuilder::audit`](crate::ClientBuilder::audit),
//! the client records one [`AuditEvent`] per API request. Sinks never
//! propagate failures: a sink that cannot write logs the problem through
//! the `log` facade and drops the event, so auditing can never take down
//! the request path it observes.

mod file;
mod stream;
mod syslog;

pub use file::RotatingFileSink;
pub use stream::StreamSink;
pub use syslog::UdpSyslogSink;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One API request, as seen by the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// When the request completed.
    pub timestamp: DateTime<Utc>,

    /// HTTP method.
    pub method: String,

    /// Namespace-qualified path (e.g. "cmdb/firewall/address/lan").
    pub path: String,

    /// Scope the request ran under ("global" or the VDOM name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vdom: Option<String>,

    /// "success" or "error".
    pub outcome: String,

    /// HTTP status from the response envelope, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,

    /// Error description for failed requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wall-clock duration of the request.
    pub elapsed_ms: u64,
}

impl AuditEvent {
    /// The event as one JSON line.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Destination for audit events.
///
/// Implementations must swallow their own failures; `record` has no error
/// channel on purpose.
pub trait AuditSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: &AuditEvent);

    /// Flush buffered events, if the sink buffers.
    fn flush(&self) {}
}

/// Sink that discards every event.
#[derive(Debug, Default)]
pub struct NoopSink;

impl AuditSink for NoopSink {
    fn record(&self, _event: &AuditEvent) {}
}

/// Sink that hands each event to a user closure.
pub struct CallbackSink {
    callback: Box<dyn Fn(&AuditEvent) + Send + Sync>,
}

impl CallbackSink {
    /// Wrap a closure as a sink.
    pub fn new(callback: impl Fn(&AuditEvent) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl AuditSink for CallbackSink {
    fn record(&self, event: &AuditEvent) {
        (self.callback)(event);
    }
}

/// Sink that forwards each event to several child sinks in order.
///
/// Children isolate their own failures, so one failing sink cannot keep
/// the event from the others.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn AuditSink>>,
}

impl FanoutSink {
    /// Create an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child sink.
    pub fn with(mut self, sink: impl AuditSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl AuditSink for FanoutSink {
    fn record(&self, event: &AuditEvent) {
        for sink in &self.sinks {
            sink.record(event);
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}

#[cfg(test)]
pub(crate) fn test_event(outcome: &str) -> AuditEvent {
    AuditEvent {
        timestamp: Utc::now(),
        method: "GET".to_string(),
        path: "cmdb/firewall/address".to_string(),
        vdom: Some("root".to_string()),
        outcome: outcome.to_string(),
        http_status: if outcome == "success" { Some(200) } else { None },
        error: (outcome == "error").then(|| "Resource not found: '/x'".to_string()),
        elapsed_ms: 12,
    }
}
