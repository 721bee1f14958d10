//! Latest-snapshot projection for the dashboard

use serde::Serialize;

use crate::event_log::{EventLog, EventLogError, LogRecord};

/// Newest prediction, shaped for the dashboard. Values stay strings;
/// the page does its own number formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestSnapshot {
    pub waktu: String,
    pub suhu: String,
    pub kelembaban: String,
    pub angin: String,
    pub tekanan: String,
    pub prediksi: String,
    pub latency: String,
}

impl From<LogRecord> for LatestSnapshot {
    fn from(record: LogRecord) -> Self {
        Self {
            // "2025-07-14 09:30:00+07:00" -> "2025-07-14T09:30:00+07:00"
            waktu: record.timestamp.replacen(' ', "T", 1),
            suhu: record.suhu,
            kelembaban: record.kelembaban,
            angin: record.kecepatan_angin,
            tekanan: record.tekanan_udara,
            prediksi: record.prediksi,
            latency: record.latency,
        }
    }
}

pub fn latest(log: &EventLog) -> Result<LatestSnapshot, EventLogError> {
    log.read_last().map(LatestSnapshot::from)
}
