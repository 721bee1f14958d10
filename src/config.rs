//! Configuration module

use std::env;
use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};

/// Default offset for log timestamps: WIB (UTC+07:00)
pub const DEFAULT_TZ_OFFSET_MINUTES: i32 = 7 * 60;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Trained classifier (ONNX graph)
    pub model_path: PathBuf,

    /// Label decoder (JSON class list)
    pub encoder_path: PathBuf,

    /// Prediction event log (CSV)
    pub log_path: PathBuf,

    /// Local civil time used for log timestamps
    pub timezone: FixedOffset,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "weather_model.onnx".to_string())
                .into(),

            encoder_path: env::var("ENCODER_PATH")
                .unwrap_or_else(|_| "label_encoder.json".to_string())
                .into(),

            log_path: env::var("LOG_PATH")
                .unwrap_or_else(|_| "log_prediksi.csv".to_string())
                .into(),

            timezone: env::var("TZ_OFFSET_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .and_then(offset_from_minutes)
                .unwrap_or_else(default_timezone),
        }
    }
}

/// WIB, the zone the weather station reports in.
pub fn default_timezone() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_TZ_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix())
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}
