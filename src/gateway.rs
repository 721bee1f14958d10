//! Inference Gateway
//!
//! Turns a raw request body into a forecast: parse and validate the reading,
//! build the feature row, classify, time it, and log the outcome. Logging is
//! best-effort; a prediction that succeeded is returned even if the event log
//! could not be written.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{FixedOffset, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::event_log::{EventLog, LogRecord};
use crate::model::{FeatureVector, ModelArtifact, FEATURE_COUNT};

/// Request fields in training order. Changing this order silently breaks
/// every prediction.
pub const FIELDS: [&str; FEATURE_COUNT] = ["suhu", "kelembaban", "kecepatan_angin", "tekanan_udara"];

/// Log timestamp layout, e.g. `2025-07-14 09:30:00+07:00`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("model unavailable")]
    ServiceUnavailable,

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("inference error: {0}")]
    Inference(String),
}

// ============================================================================
// SENSOR READING
// ============================================================================

/// One validated reading from the station
#[derive(Debug, Clone)]
pub struct SensorReading {
    /// Feature row handed to the classifier
    pub values: [f64; FEATURE_COUNT],
    /// Each value exactly as it appeared in the request body
    pub raw: [String; FEATURE_COUNT],
    /// The whole JSON object received, echoed back to the device
    pub received: Map<String, Value>,
}

impl SensorReading {
    pub fn parse(body: &[u8]) -> Result<Self, GatewayError> {
        let parsed: Value = serde_json::from_slice(body).map_err(|e| {
            GatewayError::MalformedRequest(format!("Request body is not valid JSON: {}", e))
        })?;

        let Value::Object(received) = parsed else {
            return Err(GatewayError::MalformedRequest(
                "Request body must be a JSON object".to_string(),
            ));
        };

        let mut values = [0.0; FEATURE_COUNT];
        let mut raw: [String; FEATURE_COUNT] = Default::default();

        for (i, &name) in FIELDS.iter().enumerate() {
            let value = received.get(name).ok_or(GatewayError::MissingField(name))?;
            let Value::Number(number) = value else {
                return Err(GatewayError::MalformedRequest(format!(
                    "Field '{}' must be a number, got {}",
                    name, value
                )));
            };
            values[i] = number.as_f64().ok_or_else(|| {
                GatewayError::MalformedRequest(format!("Field '{}' is not representable as a number", name))
            })?;
            raw[i] = number.to_string();
        }

        Ok(Self { values, raw, received })
    }

    /// Build the single feature row, in `FIELDS` order
    pub fn features(&self) -> Result<FeatureVector, GatewayError> {
        let mut row = [0.0f32; FEATURE_COUNT];
        for (i, value) in self.values.iter().enumerate() {
            let narrowed = *value as f32;
            if !narrowed.is_finite() {
                return Err(GatewayError::Inference(format!(
                    "Feature '{}' ({}) is out of range for the model",
                    FIELDS[i], value
                )));
            }
            row[i] = narrowed;
        }
        Ok(row)
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

#[derive(Debug, Clone)]
pub struct PredictionResult {
    pub category: String,
    pub reading: SensorReading,
    /// Seconds, rounded to milliseconds
    pub latency_secs: f64,
}

/// Running totals for the health endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayStats {
    pub model_loaded: bool,
    pub predictions_served: u64,
    pub avg_latency_ms: f64,
}

pub struct PredictionGateway {
    model: Option<Arc<ModelArtifact>>,
    log: Arc<EventLog>,
    timezone: FixedOffset,
    served: AtomicU64,
    latency_us_sum: AtomicU64,
}

impl PredictionGateway {
    /// `model` is `None` when the artifacts failed to load at startup
    pub fn new(model: Option<Arc<ModelArtifact>>, log: Arc<EventLog>, timezone: FixedOffset) -> Self {
        Self {
            model,
            log,
            timezone,
            served: AtomicU64::new(0),
            latency_us_sum: AtomicU64::new(0),
        }
    }

    /// Classify one request body and record the outcome
    pub fn predict(&self, body: &[u8]) -> Result<PredictionResult, GatewayError> {
        let started = Instant::now();

        let model = self.model.as_ref().ok_or(GatewayError::ServiceUnavailable)?;

        let reading = SensorReading::parse(body)?;
        let features = reading.features()?;

        let category = model
            .classify(&features)
            .map_err(|e| GatewayError::Inference(e.0))?
            .to_string();

        let elapsed = started.elapsed();
        let latency_secs = round_to_millis(elapsed);

        let record = LogRecord {
            timestamp: Utc::now().with_timezone(&self.timezone).format(TIMESTAMP_FORMAT).to_string(),
            suhu: reading.raw[0].clone(),
            kelembaban: reading.raw[1].clone(),
            kecepatan_angin: reading.raw[2].clone(),
            tekanan_udara: reading.raw[3].clone(),
            prediksi: category.clone(),
            latency: format!("{:.3}", latency_secs),
        };

        if let Err(e) = self.log.append(&record) {
            tracing::warn!("Prediction served but not logged: {}", e);
        }

        self.served.fetch_add(1, Ordering::Relaxed);
        self.latency_us_sum.fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);

        Ok(PredictionResult {
            category,
            reading,
            latency_secs,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn stats(&self) -> GatewayStats {
        let served = self.served.load(Ordering::Relaxed);
        let sum = self.latency_us_sum.load(Ordering::Relaxed);
        GatewayStats {
            model_loaded: self.is_ready(),
            predictions_served: served,
            avg_latency_ms: if served > 0 { sum as f64 / served as f64 / 1000.0 } else { 0.0 },
        }
    }
}

fn round_to_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::{artifact_with, BrokenClassifier, FixedClassifier, RuleClassifier, CLASSES};
    use chrono::DateTime;
    use std::fs;
    use tempfile::TempDir;

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn gateway(dir: &TempDir, model: Option<ModelArtifact>) -> (PredictionGateway, Arc<EventLog>) {
        let log = Arc::new(EventLog::new(dir.path().join("log_prediksi.csv")));
        let gw = PredictionGateway::new(model.map(Arc::new), Arc::clone(&log), wib());
        (gw, log)
    }

    const CLEAR_SKY: &str = r#"{"suhu": 28.5, "kelembaban": 70, "kecepatan_angin": 1.2, "tekanan_udara": 101.3}"#;

    #[test]
    fn test_predict_clear_sky_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let (gw, log) = gateway(&dir, Some(artifact_with(RuleClassifier)));

        let result = gw.predict(CLEAR_SKY.as_bytes()).unwrap();
        assert_eq!(result.category, "Cerah");
        assert!(result.latency_secs >= 0.0);
        assert_eq!(result.reading.received.len(), 4);

        let last = log.read_last().unwrap();
        assert_eq!(last.suhu, "28.5");
        assert_eq!(last.kelembaban, "70");
        assert_eq!(last.kecepatan_angin, "1.2");
        assert_eq!(last.tekanan_udara, "101.3");
        assert_eq!(last.prediksi, "Cerah");
        assert!(last.latency.parse::<f64>().unwrap() >= 0.0);
        assert_eq!(last.latency.split('.').nth(1).map(str::len), Some(3));

        let ts = DateTime::parse_from_str(&last.timestamp, TIMESTAMP_FORMAT).unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_category_always_from_label_set() {
        let dir = tempfile::tempdir().unwrap();
        let (gw, _) = gateway(&dir, Some(artifact_with(RuleClassifier)));

        for suhu in [18.0, 25.0, 33.0] {
            for kelembaban in [40.0, 80.0, 88.0, 97.0] {
                for tekanan in [99.8, 101.3] {
                    let body = format!(
                        r#"{{"suhu": {}, "kelembaban": {}, "kecepatan_angin": 2.5, "tekanan_udara": {}}}"#,
                        suhu, kelembaban, tekanan
                    );
                    let result = gw.predict(body.as_bytes()).unwrap();
                    assert!(CLASSES.contains(&result.category.as_str()));
                }
            }
        }
        assert_eq!(gw.stats().predictions_served, 24);
    }

    #[test]
    fn test_missing_field_is_named_and_not_logged() {
        let dir = tempfile::tempdir().unwrap();
        let (gw, log) = gateway(&dir, Some(artifact_with(RuleClassifier)));

        let body = r#"{"suhu": 28.5, "kelembaban": 70, "kecepatan_angin": 1.2}"#;
        match gw.predict(body.as_bytes()) {
            Err(GatewayError::MissingField(name)) => assert_eq!(name, "tekanan_udara"),
            other => panic!("expected missing field, got {:?}", other.map(|r| r.category)),
        }
        assert!(!log.path().exists());
    }

    #[test]
    fn test_first_missing_field_reported_in_training_order() {
        let dir = tempfile::tempdir().unwrap();
        let (gw, _) = gateway(&dir, Some(artifact_with(RuleClassifier)));

        let err = gw.predict(br#"{"tekanan_udara": 101.3}"#).unwrap_err();
        assert!(matches!(err, GatewayError::MissingField("suhu")));
    }

    #[test]
    fn test_malformed_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let (gw, log) = gateway(&dir, Some(artifact_with(RuleClassifier)));

        for body in ["", "suhu=28.5", "[28.5, 70, 1.2, 101.3]", "42"] {
            assert!(
                matches!(gw.predict(body.as_bytes()), Err(GatewayError::MalformedRequest(_))),
                "body {:?} should be rejected",
                body
            );
        }

        let not_a_number = r#"{"suhu": "hot", "kelembaban": 70, "kecepatan_angin": 1.2, "tekanan_udara": 101.3}"#;
        assert!(matches!(gw.predict(not_a_number.as_bytes()), Err(GatewayError::MalformedRequest(_))));
        assert!(!log.path().exists());
    }

    #[test]
    fn test_model_unavailable_never_touches_log() {
        let dir = tempfile::tempdir().unwrap();
        let (gw, log) = gateway(&dir, None);

        assert!(matches!(gw.predict(CLEAR_SKY.as_bytes()), Err(GatewayError::ServiceUnavailable)));
        // checked before the body is even parsed
        assert!(matches!(gw.predict(b"not json"), Err(GatewayError::ServiceUnavailable)));
        assert!(!log.path().exists());
        assert!(!gw.stats().model_loaded);
    }

    #[test]
    fn test_inference_failures() {
        let dir = tempfile::tempdir().unwrap();

        let (gw, log) = gateway(&dir, Some(artifact_with(BrokenClassifier)));
        assert!(matches!(gw.predict(CLEAR_SKY.as_bytes()), Err(GatewayError::Inference(_))));
        assert!(!log.path().exists());

        let (gw, _) = gateway(&dir, Some(artifact_with(FixedClassifier(17))));
        assert!(matches!(gw.predict(CLEAR_SKY.as_bytes()), Err(GatewayError::Inference(_))));

        let (gw, _) = gateway(&dir, Some(artifact_with(RuleClassifier)));
        let huge = r#"{"suhu": 1e300, "kelembaban": 70, "kecepatan_angin": 1.2, "tekanan_udara": 101.3}"#;
        assert!(matches!(gw.predict(huge.as_bytes()), Err(GatewayError::Inference(_))));
    }

    #[test]
    fn test_log_failure_does_not_fail_prediction() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the log file should be
        let blocked = dir.path().join("log_prediksi.csv");
        fs::create_dir(&blocked).unwrap();

        let log = Arc::new(EventLog::new(&blocked));
        let gw = PredictionGateway::new(Some(Arc::new(artifact_with(RuleClassifier))), log, wib());

        let result = gw.predict(CLEAR_SKY.as_bytes()).unwrap();
        assert_eq!(result.category, "Cerah");
    }

    #[test]
    fn test_values_logged_exactly_as_received() {
        let dir = tempfile::tempdir().unwrap();
        let (gw, log) = gateway(&dir, Some(artifact_with(RuleClassifier)));

        let body = r#"{"suhu": 28.50, "kelembaban": 7e1, "kecepatan_angin": 1.20, "tekanan_udara": 1013.250}"#;
        let result = gw.predict(body.as_bytes()).unwrap();
        assert_eq!(result.category, "Cerah");
        assert_eq!(result.reading.received["suhu"].to_string(), "28.50");

        let last = log.read_last().unwrap();
        assert_eq!(last.suhu, "28.50");
        assert_eq!(last.kelembaban, "7e1");
        assert_eq!(last.kecepatan_angin, "1.20");
        assert_eq!(last.tekanan_udara, "1013.250");
    }

    #[test]
    fn test_large_integer_kept_verbatim() {
        let body = r#"{"suhu": 28.5, "kelembaban": 70, "kecepatan_angin": 1.2, "tekanan_udara": 12345678901234567890123}"#;
        let reading = SensorReading::parse(body.as_bytes()).unwrap();

        assert_eq!(reading.raw[3], "12345678901234567890123");
        assert_eq!(reading.values[1], 70.0);
        assert!(reading.values[3] > 1.2e22);
    }

    #[test]
    fn test_extra_fields_are_echoed_not_logged() {
        let dir = tempfile::tempdir().unwrap();
        let (gw, log) = gateway(&dir, Some(artifact_with(RuleClassifier)));

        let body = r#"{"suhu": 28.5, "kelembaban": 70, "kecepatan_angin": 1.2, "tekanan_udara": 101.3, "device": "esp32-01"}"#;
        let result = gw.predict(body.as_bytes()).unwrap();
        assert_eq!(result.reading.received["device"], "esp32-01");

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(!content.contains("esp32-01"));
    }

    #[test]
    fn test_round_to_millis() {
        assert_eq!(round_to_millis(Duration::from_micros(1499)), 0.001);
        assert_eq!(round_to_millis(Duration::from_micros(1500)), 0.002);
        assert_eq!(round_to_millis(Duration::from_secs(2)), 2.0);
    }
}
