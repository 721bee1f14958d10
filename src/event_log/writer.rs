use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::atomic::Ordering;

use super::record::header_line;
use super::{EventLog, EventLogError, LogRecord};

impl EventLog {
    /// Append one record, writing the header first if the file is new.
    /// Thread-safe: concurrent callers are serialized on the log guard.
    pub fn append(&self, record: &LogRecord) -> Result<(), EventLogError> {
        let line = record.to_line()?;

        let _guard = self.guard.lock();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut chunk = String::with_capacity(line.len() + 128);
        if file.metadata()?.len() == 0 {
            chunk.push_str(&header_line());
            chunk.push('\n');
            tracing::info!("Created prediction log: {}", self.path.display());
        }
        chunk.push_str(&line);
        chunk.push('\n');

        // Single write so a crash leaves at most one torn tail line
        file.write_all(chunk.as_bytes())?;
        file.flush()?;
        file.sync_data()?;

        self.appended.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
