//! Event Log Module - Prediction History
//!
//! Every successful prediction is appended as one CSV line to a single file.
//! The file is created on the first write together with its header row and
//! only ever grows; the dashboard reads the newest line and `/log` streams
//! the whole file.

pub mod export;
pub mod reader;
pub mod record;
pub mod writer;


use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use thiserror::Error;

pub use export::EXPORT_FILE_NAME;
pub use record::LogRecord;

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("no prediction has been logged yet")]
    NotFound,

    #[error("event log I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt event log line: {0}")]
    Corrupt(String),

    #[error("record cannot be stored: {0}")]
    InvalidRecord(String),
}

/// Owner of the on-disk log.
///
/// All access goes through `guard`, so the "is the file empty, then write the
/// header" decision and the write itself happen as one step, and readers never
/// observe a half-written line.
pub struct EventLog {
    path: PathBuf,
    guard: Mutex<()>,
    appended: AtomicU64,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
            appended: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended by this process
    pub fn records_written(&self) -> u64 {
        self.appended.load(Ordering::Relaxed)
    }
}
