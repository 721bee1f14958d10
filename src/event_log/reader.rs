use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use super::record::header_line;
use super::{EventLog, EventLogError, LogRecord};

/// Bytes read per step when scanning backwards from the end of the file
const TAIL_CHUNK: u64 = 4 * 1024;

/// Last non-empty line of a file
struct TailLine {
    text: String,
    /// No line precedes it, i.e. it is the header row
    is_first: bool,
}

impl EventLog {
    /// Decode the most recently appended record.
    ///
    /// Reads backwards from the end of the file, so the cost does not grow
    /// with the size of the log.
    pub fn read_last(&self) -> Result<LogRecord, EventLogError> {
        let _guard = self.guard.lock();

        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(EventLogError::NotFound),
            Err(e) => return Err(e.into()),
        };

        let tail = read_last_line(&mut file)?.ok_or(EventLogError::NotFound)?;

        if tail.is_first && tail.text == header_line() {
            return Err(EventLogError::NotFound);
        }

        LogRecord::from_line(&tail.text)
    }
}

fn read_last_line(file: &mut File) -> Result<Option<TailLine>, EventLogError> {
    let mut pos = file.metadata()?.len();
    let mut buf: Vec<u8> = Vec::new();

    while pos > 0 {
        let start = pos.saturating_sub(TAIL_CHUNK);
        let mut chunk = vec![0u8; (pos - start) as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
        pos = start;

        let Some(end) = buf.iter().rposition(|b| *b != b'\n' && *b != b'\r').map(|i| i + 1) else {
            // only line breaks so far
            continue;
        };

        if let Some(nl) = buf[..end].iter().rposition(|b| *b == b'\n') {
            return decode(&buf[nl + 1..end], false).map(Some);
        }
        if pos == 0 {
            return decode(&buf[..end], true).map(Some);
        }
    }

    Ok(None)
}

fn decode(bytes: &[u8], is_first: bool) -> Result<TailLine, EventLogError> {
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|e| EventLogError::Corrupt(e.to_string()))?;
    Ok(TailLine { text, is_first })
}
