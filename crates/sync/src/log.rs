//! Append-only run-result log.
//!
//! The sync writes its business outcomes (created objects, warnings,
//! per-item errors) to a plain text file, one timestamped line per event.
//! This is an output artifact of the run, separate from `tracing` console
//! diagnostics. Write failures never propagate to the caller; the log is
//! best-effort by design of the original tooling.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

/// The append-only result log for one sync run.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Create a handle for the log at `path`. The file itself is opened
    /// per write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the log to empty. Called once at the start of a sync run;
    /// cleanup routines leave the log untouched.
    pub fn clear(&self) {
        if let Err(e) = std::fs::write(&self.path, "") {
            tracing::warn!(path = %self.path.display(), "failed to clear run log: {e}");
        }
    }

    /// Append one timestamped line: `<RFC 3339 timestamp> - <message>`.
    pub fn append(&self, message: &str) {
        let line = format!(
            "{} - {message}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), "failed to append to run log: {e}");
        }
    }
}
