//! Cardiac Risk API Server
//!
//! JSON surface over the clinical form: presets, the predict action, and
//! service health.

use axum::{extract::State, response::IntoResponse, routing::get, routing::post, Json, Router};
use data_validator::Validator;
use inference_engine::{load_classifier, load_transform, InferenceEngine, InferenceError};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use verdict::VerdictConfig;

pub mod config;
pub mod error;
mod routes;

pub use crate::config::{AppConfig, ModelConfig};
pub use crate::error::ApiError;

use feature_engine::{ScalingSubset, SchemaDescriptor};

/// Application state shared across handlers
pub struct AppState {
    pub engine: InferenceEngine,
    pub validator: Validator,
    pub verdict: VerdictConfig,
    /// Startup schema and scaling checks; predictions are withheld while this is an error
    pub compatibility: Result<(), InferenceError>,
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an already built engine
    pub fn new(engine: InferenceEngine, validator: Validator, verdict: VerdictConfig) -> Self {
        let compatibility = engine.check_compatibility();
        if let Err(e) = &compatibility {
            warn!("Model and schema are incompatible: {}", e);
        }
        Self {
            engine,
            validator,
            verdict,
            compatibility,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    /// Load artifacts and build state from configuration
    ///
    /// A missing or unreadable artifact is an error. Schema and scaling
    /// mismatches are recorded in `compatibility` instead.
    pub fn from_config(config: &AppConfig) -> Result<Self, InferenceError> {
        let model = &config.model;
        let classifier = load_classifier(&model.model_path)?;

        let schema = match &model.schema_fields {
            Some(names) => {
                let schema = SchemaDescriptor::from_declared_names(names.as_slice())?;
                if model.include_id_placeholder {
                    schema.with_id_placeholder()
                } else {
                    schema
                }
            }
            None => InferenceEngine::default_schema(classifier.as_ref(), model.include_id_placeholder),
        };

        let mut engine = InferenceEngine::new(classifier, schema);
        let mut scaling = Ok(());
        if let Some(path) = &model.scaler_path {
            let transform = load_transform(path)?;
            let subset = model.scaled_fields.as_ref().map(ScalingSubset::new);
            scaling = engine.set_transform(transform, subset);
            if let Err(e) = &scaling {
                warn!("Scaler rejected, predictions withheld: {}", e);
            }
        }

        let mut state = Self::new(
            engine,
            Validator::new(config.validation.clone()),
            config.verdict.clone(),
        );
        state.compatibility = state.compatibility.and(scaling);
        Ok(state)
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelStatus,
}

/// Loaded model summary
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub backend: &'static str,
    pub expected_dimension: usize,
    pub schema: Vec<String>,
    pub scaled_fields: Option<Vec<String>>,
    pub supports_probability: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/presets", get(routes::presets::list_presets))
        .route("/api/v1/presets/:name", get(routes::presets::get_preset))
        .route("/api/v1/predict", post(routes::predict::predict))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let engine = &state.engine;
    let response = HealthResponse {
        status: if state.compatibility.is_ok() {
            "healthy"
        } else {
            "degraded"
        },
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelStatus {
            backend: engine.backend(),
            expected_dimension: engine.expected_dimension(),
            schema: engine.schema().names().into_iter().map(String::from).collect(),
            scaled_fields: engine.scaling_subset().map(|s| s.fields().to_vec()),
            supports_probability: engine.supports_probability(),
            error: state.compatibility.as_ref().err().map(ToString::to_string),
        },
    };

    Json(response)
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or_else(|| ApiError::NotFound("metrics recorder not installed".to_string()))
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Run the server
pub async fn run_server(addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
