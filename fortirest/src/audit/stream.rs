//! Stream sink: JSON lines to any writer.

use std::io::{self, Write};
use std::sync::Mutex;

use log::warn;

use super::{AuditEvent, AuditSink};

/// Sink that writes events as JSON lines to a writer.
pub struct StreamSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> StreamSink<W> {
    /// Wrap a writer as a sink.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl StreamSink<io::Stderr> {
    /// Sink writing to standard error.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> AuditSink for StreamSink<W> {
    fn record(&self, event: &AuditEvent) {
        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{}", event.to_json_line()) {
            warn!("audit stream write failed: {}", e);
        }
    }

    fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
