//! UDP syslog sink.

use std::io;
use std::net::{ToSocketAddrs, UdpSocket};

use log::warn;

use super::{AuditEvent, AuditSink};

/// Sink that sends events as RFC 3164 datagrams to a syslog collector.
///
/// Successful requests go out at severity `info`, failed ones at
/// `warning`. The JSON event rides in the message part. Timestamps are
/// UTC.
pub struct UdpSyslogSink {
    socket: UdpSocket,
    facility: u8,
    hostname: String,
    tag: String,
}

impl UdpSyslogSink {
    /// Create a sink sending to `target` (e.g. `"syslog.example.com:514"`).
    ///
    /// Binds an ephemeral local port; the default facility is local0 (16),
    /// the default tag `fortirest`.
    pub fn new(target: impl ToSocketAddrs) -> io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(target)?;
        Ok(Self {
            socket,
            facility: 16,
            hostname: "localhost".to_string(),
            tag: "fortirest".to_string(),
        })
    }

    /// Set the syslog facility (default: 16, local0).
    pub fn with_facility(mut self, facility: u8) -> Self {
        self.facility = facility;
        self
    }

    /// Set the hostname field of the header.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Set the tag field of the header.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    fn format_message(&self, event: &AuditEvent) -> String {
        let severity: u16 = if event.outcome == "error" { 4 } else { 6 };
        let pri = (self.facility as u16) * 8 + severity;
        format!(
            "<{}>{} {} {}: {}",
            pri,
            event.timestamp.format("%b %e %H:%M:%S"),
            self.hostname,
            self.tag,
            event.to_json_line()
        )
    }
}

impl AuditSink for UdpSyslogSink {
    fn record(&self, event: &AuditEvent) {
        let message = self.format_message(event);
        if let Err(e) = self.socket.send(message.as_bytes()) {
            warn!("audit syslog send failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::test_event;

    fn test_sink() -> UdpSyslogSink {
        UdpSyslogSink::new("127.0.0.1:5514")
            .unwrap()
            .with_hostname("fw-mgmt")
            .with_tag("fortirest-test")
    }

    #[test]
    fn test_pri_encodes_facility_and_severity() {
        let sink = test_sink();

        // local0 (16) * 8 + info (6) = 134
        let message = sink.format_message(&test_event("success"));
        assert!(message.starts_with("<134>"), "got: {}", message);

        // local0 (16) * 8 + warning (4) = 132
        let message = sink.format_message(&test_event("error"));
        assert!(message.starts_with("<132>"), "got: {}", message);

        let sink = test_sink().with_facility(1); // user
        let message = sink.format_message(&test_event("success"));
        assert!(message.starts_with("<14>"), "got: {}", message);
    }

    #[test]
    fn test_header_and_payload_layout() {
        let sink = test_sink();
        let message = sink.format_message(&test_event("success"));

        assert!(message.contains(" fw-mgmt fortirest-test: {"));
        let json_part = message.split(": ").nth(1).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(json_part).unwrap();
        assert_eq!(parsed["path"], "cmdb/firewall/address");
    }

    #[test]
    fn test_send_to_unreachable_collector_does_not_panic() {
        // Nothing listens on this port; UDP send still succeeds or the
        // error is swallowed by record()
        let sink = test_sink();
        sink.record(&test_event("success"));
    }
}
