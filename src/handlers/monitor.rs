//! Monitoring handlers: newest record and full log download

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    Json,
};
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

use crate::event_log::EXPORT_FILE_NAME;
use crate::snapshot::{self, LatestSnapshot};
use crate::{AppState, AppResult};

/// Newest logged prediction, polled by the dashboard
pub async fn latest_data(State(state): State<AppState>) -> AppResult<Json<LatestSnapshot>> {
    let log = Arc::clone(&state.event_log);
    let snapshot = tokio::task::spawn_blocking(move || snapshot::latest(&log)).await??;
    Ok(Json(snapshot))
}

/// Stream the whole prediction log as a CSV download
pub async fn download_log(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let log = Arc::clone(&state.event_log);
    let export = tokio::task::spawn_blocking(move || log.export_all()).await??;

    tracing::info!("Log download started ({} bytes)", export.len);

    let file = tokio::fs::File::from_std(export.file).take(export.len);
    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME)),
    ];

    Ok((headers, body))
}
