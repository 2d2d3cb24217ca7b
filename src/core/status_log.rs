//! Append-only status log with one timestamped line per event.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct StatusLog {
    path: PathBuf,
}

impl StatusLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a line, surfacing IO failures to the caller
    pub fn append(&self, message: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_line(&Local::now().format(TIMESTAMP_FORMAT).to_string(), message))
    }

    /// Record a status line. Write failures only produce a warning.
    pub fn record(&self, message: &str) {
        log::info!("{}", message);
        if let Err(e) = self.append(message) {
            log::warn!(
                "Failed to write status log {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

fn format_line(timestamp: &str, message: &str) -> String {
    format!("{} - {}", timestamp, message)
}
