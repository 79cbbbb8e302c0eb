//! Rotating file sink.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use log::warn;

use super::{AuditEvent, AuditSink};

/// Sink that appends JSON lines to a file, rotating by size.
///
/// When the file would exceed `max_bytes`, it is renamed to `<path>.1`
/// (existing backups shift to `.2`, `.3`, ... and the oldest beyond
/// `max_backups` is dropped) and a fresh file is started. With
/// `max_backups == 0` the file is simply truncated.
pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    file: Option<File>,
    len: u64,
}

impl RotatingFileSink {
    /// Create a sink writing to `path`.
    ///
    /// The file is opened lazily on the first event, so construction
    /// cannot fail.
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64, max_backups: usize) -> Self {
        Self {
            path: path.into(),
            max_bytes,
            max_backups,
            state: Mutex::new(State::default()),
        }
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.path.display(), index))
    }

    fn open(&self, state: &mut State) -> io::Result<()> {
        if state.file.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            state.len = file.metadata()?.len();
            state.file = Some(file);
        }
        Ok(())
    }

    fn rotate(&self, state: &mut State) -> io::Result<()> {
        state.file = None;
        state.len = 0;

        if self.max_backups == 0 {
            fs::remove_file(&self.path)?;
            return Ok(());
        }

        let _ = fs::remove_file(self.backup_path(self.max_backups));
        for index in (1..self.max_backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))
    }

    fn try_record(&self, state: &mut State, line: &str) -> io::Result<()> {
        self.open(state)?;

        let line_len = line.len() as u64 + 1;
        if state.len > 0 && state.len + line_len > self.max_bytes {
            self.rotate(state)?;
            self.open(state)?;
        }

        if let Some(file) = &mut state.file {
            writeln!(file, "{}", line)?;
            state.len += line_len;
        }
        Ok(())
    }
}

impl AuditSink for RotatingFileSink {
    fn record(&self, event: &AuditEvent) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Err(e) = self.try_record(&mut state, &event.to_json_line()) {
            warn!("audit file write to {} failed: {}", self.path.display(), e);
        }
    }

    fn flush(&self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(file) = &mut state.file {
                let _ = file.flush();
            }
        }
    }
}
