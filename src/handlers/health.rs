//! Health check and index handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_loaded: bool,
    predictions_served: u64,
    records_logged: u64,
    avg_latency_ms: f64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.gateway.stats();
    Json(HealthResponse {
        status: if stats.model_loaded { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_loaded: stats.model_loaded,
        predictions_served: stats.predictions_served,
        records_logged: state.event_log.records_written(),
        avg_latency_ms: stats.avg_latency_ms,
    })
}

pub async fn index() -> &'static str {
    "Selamat Datang di API Sistem Prediksi Cuaca GH TRB Padang. Gunakan endpoint /predict untuk membuat prediksi."
}
