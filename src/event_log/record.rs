use std::borrow::Cow;

use super::EventLogError;

/// Column names, in on-disk order
pub const COLUMNS: [&str; 7] = [
    "timestamp",
    "suhu",
    "kelembaban",
    "kecepatan_angin",
    "tekanan_udara",
    "prediksi",
    "latency",
];

const SEPARATOR: char = ',';
const QUOTE: char = '"';

/// One logged prediction. Every field is kept as text exactly as it was
/// written; numeric interpretation is left to whoever reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: String,
    pub suhu: String,
    pub kelembaban: String,
    pub kecepatan_angin: String,
    pub tekanan_udara: String,
    pub prediksi: String,
    pub latency: String,
}

impl LogRecord {
    pub fn fields(&self) -> [&str; 7] {
        [
            &self.timestamp,
            &self.suhu,
            &self.kelembaban,
            &self.kecepatan_angin,
            &self.tekanan_udara,
            &self.prediksi,
            &self.latency,
        ]
    }

    /// Encode as a single CSV line, without the trailing newline
    pub fn to_line(&self) -> Result<String, EventLogError> {
        if let Some(i) = self.fields().iter().position(|f| f.contains(['\n', '\r'])) {
            return Err(EventLogError::InvalidRecord(format!(
                "field '{}' contains a line break",
                COLUMNS[i]
            )));
        }
        Ok(join(self.fields()))
    }

    /// Decode a CSV line by position
    pub fn from_line(line: &str) -> Result<Self, EventLogError> {
        let fields = split(line)?;
        let [timestamp, suhu, kelembaban, kecepatan_angin, tekanan_udara, prediksi, latency]: [String; 7] =
            fields.try_into().map_err(|f: Vec<String>| {
                EventLogError::Corrupt(format!("expected {} fields, found {}", COLUMNS.len(), f.len()))
            })?;

        Ok(Self {
            timestamp,
            suhu,
            kelembaban,
            kecepatan_angin,
            tekanan_udara,
            prediksi,
            latency,
        })
    }
}

/// The header row, without the trailing newline
pub fn header_line() -> String {
    join(COLUMNS)
}

fn join(fields: [&str; 7]) -> String {
    fields
        .iter()
        .map(|f| encode_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_field(field: &str) -> Cow<'_, str> {
    if field.contains([SEPARATOR, QUOTE]) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn split(line: &str) -> Result<Vec<String>, EventLogError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            QUOTE if in_quotes => {
                if chars.peek() == Some(&QUOTE) {
                    current.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            QUOTE if current.is_empty() => in_quotes = true,
            SEPARATOR if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(EventLogError::Corrupt(format!("unterminated quote in: {}", line)));
    }
    fields.push(current);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(prediksi: &str) -> LogRecord {
        LogRecord {
            timestamp: "2025-07-14 09:30:00+07:00".to_string(),
            suhu: "28.5".to_string(),
            kelembaban: "70".to_string(),
            kecepatan_angin: "1.2".to_string(),
            tekanan_udara: "101.3".to_string(),
            prediksi: prediksi.to_string(),
            latency: "0.004".to_string(),
        }
    }

    #[test]
    fn test_header_names_seven_columns() {
        assert_eq!(
            header_line(),
            "timestamp,suhu,kelembaban,kecepatan_angin,tekanan_udara,prediksi,latency"
        );
    }

    #[test]
    fn test_plain_fields_written_literally() {
        let line = record("Hujan Deras").to_line().unwrap();
        assert_eq!(line, "2025-07-14 09:30:00+07:00,28.5,70,1.2,101.3,Hujan Deras,0.004");
        assert_eq!(LogRecord::from_line(&line).unwrap(), record("Hujan Deras"));
    }

    #[test]
    fn test_separator_inside_field_is_quoted() {
        let r = record("Cerah, \"berangin\"");
        let line = r.to_line().unwrap();
        assert!(line.contains("\"Cerah, \"\"berangin\"\"\""));
        assert_eq!(LogRecord::from_line(&line).unwrap(), r);
    }

    #[test]
    fn test_line_break_refused() {
        assert!(matches!(
            record("Cerah\nHujan").to_line(),
            Err(EventLogError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_wrong_field_count_is_corrupt() {
        assert!(matches!(
            LogRecord::from_line("2025-07-14 09:30:00+07:00,28.5,Cerah"),
            Err(EventLogError::Corrupt(_))
        ));
    }

    #[test]
    fn test_unterminated_quote_is_corrupt() {
        assert!(matches!(
            LogRecord::from_line("a,b,c,d,e,\"Cerah,0.1"),
            Err(EventLogError::Corrupt(_))
        ));
    }
}
