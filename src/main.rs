//! Weather Forecast API Server
//!
//! Receives sensor readings from the greenhouse weather station, forecasts the
//! weather with a pre-trained classifier and logs every prediction.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  POST /predict   ┌──────────────────┐    ┌──────────────┐
//! │ ESP32 station│ ───────────────▶ │ Inference Gateway│ ─▶ │ ModelArtifact│
//! └──────────────┘                  └────────┬─────────┘    │ (ONNX+labels)│
//!                                            │ append       └──────────────┘
//!                                            ▼
//! ┌──────────────┐  /latest_data    ┌──────────────────┐
//! │  Dashboard   │ ◀─────────────── │  Event Log (CSV) │ ──▶ GET /log
//! └──────────────┘                  └──────────────────┘
//! ```

mod config;
mod error;
mod event_log;
mod gateway;
mod handlers;
mod model;
mod snapshot;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use event_log::EventLog;
use gateway::PredictionGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "cuaca_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Weather forecast server starting...");
    tracing::info!("Log timezone: UTC{}", config.timezone);

    // Model is loaded once; a failure leaves /predict answering 500
    let model = model::artifact::load_at_startup(&config.model_path, &config.encoder_path);

    let state = AppState::new(&config, model);
    tracing::info!("Prediction log: {}", state.event_log.path().display());
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await
        .context("server terminated unexpectedly")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<PredictionGateway>,
    pub event_log: Arc<EventLog>,
}

impl AppState {
    pub fn new(config: &config::Config, model: Option<Arc<model::ModelArtifact>>) -> Self {
        let event_log = Arc::new(EventLog::new(config.log_path.clone()));
        let gateway = Arc::new(PredictionGateway::new(model, Arc::clone(&event_log), config.timezone));
        Self { gateway, event_log }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/latest_data", get(handlers::monitor::latest_data))
        .route("/log", get(handlers::monitor::download_log))
        .route("/dashboard", get(handlers::dashboard::page))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
