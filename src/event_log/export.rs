use std::fs::File;
use std::io::ErrorKind;

use super::{EventLog, EventLogError};

/// Download name for the log, independent of where it lives on disk
pub const EXPORT_FILE_NAME: &str = "log_prediksi.csv";

/// An open handle on the log plus the number of bytes it held when opened.
/// Records appended afterwards are not part of the export.
#[derive(Debug)]
pub struct LogExport {
    pub file: File,
    pub len: u64,
}

impl EventLog {
    /// Open the whole log for download
    pub fn export_all(&self) -> Result<LogExport, EventLogError> {
        let _guard = self.guard.lock();

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(EventLogError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata()?.len();

        tracing::debug!("Exporting {} bytes from {}", len, self.path.display());
        Ok(LogExport { file, len })
    }
}
