//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::event_log::EventLogError;
use crate::gateway::GatewayError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Prediction errors
    ServiceUnavailable,
    MalformedRequest(String),
    MissingField(String),
    InferenceError(String),

    // Resource errors
    NotFound(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ServiceUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Model tidak tersedia. Silakan cek log server.".to_string(),
            ),
            AppError::MalformedRequest(details) => (
                StatusCode::BAD_REQUEST,
                format!("Request tidak valid. {}", details),
            ),
            AppError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                format!("Data tidak lengkap. Field yang wajib ada: '{}'", field),
            ),
            AppError::InferenceError(msg) => {
                tracing::error!("Inference error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Terjadi kesalahan saat proses prediksi: {}", msg),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::ServiceUnavailable => AppError::ServiceUnavailable,
            GatewayError::MalformedRequest(details) => AppError::MalformedRequest(details),
            GatewayError::MissingField(field) => AppError::MissingField(field.to_string()),
            GatewayError::Inference(msg) => AppError::InferenceError(msg),
        }
    }
}

impl From<EventLogError> for AppError {
    fn from(err: EventLogError) -> Self {
        match err {
            EventLogError::NotFound => AppError::NotFound("Belum ada data prediksi".to_string()),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("Worker task failed: {}", err))
    }
}
