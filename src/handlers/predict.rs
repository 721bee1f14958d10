//! Prediction handler

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{AppState, AppResult};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediksi_cuaca: String,
    pub data_diterima: Map<String, Value>,
}

/// Classify a reading sent by the station.
///
/// The body is read raw regardless of `Content-Type`; the station firmware
/// does not always set it.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<PredictResponse>> {
    let gateway = Arc::clone(&state.gateway);

    // Inference and the log append are blocking work
    let result = tokio::task::spawn_blocking(move || gateway.predict(&body)).await??;

    tracing::debug!("Predicted '{}' in {:.3}s", result.category, result.latency_secs);

    Ok(Json(PredictResponse {
        prediksi_cuaca: result.category,
        data_diterima: result.reading.received,
    }))
}
