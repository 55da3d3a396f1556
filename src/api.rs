// src/api.rs
use std::any::Any;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, AllowOrigin, CorsLayer};

use crate::config::AnalyzerConfig;
use crate::ingest::{build_source, NewsSource};
use crate::pipeline::{ErrorResponse, Pipeline, PipelineError};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub source: Arc<dyn NewsSource>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, source: Arc<dyn NewsSource>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            source,
        }
    }

    pub fn from_config(cfg: &AnalyzerConfig) -> Result<Self> {
        Ok(Self::new(Pipeline::from_config(cfg)?, build_source(cfg)?))
    }
}

pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", get(analyze))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// A panic anywhere below the router (fetch included) still yields the
/// generic internal-error JSON.
fn panic_response(_cause: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::from(PipelineError::Internal)),
    )
        .into_response()
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o.trim()) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(cors::Any)
}

#[derive(serde::Deserialize)]
struct AnalyzeQuery {
    #[serde(default, alias = "nft_name")]
    entity_name: Option<String>,
}

async fn analyze(State(state): State<AppState>, Query(q): Query<AnalyzeQuery>) -> Response {
    let entity = q.entity_name.as_deref().map(str::trim).unwrap_or_default();
    if entity.is_empty() {
        let body = ErrorResponse::new("Query parameter `entity_name` is required.", "bad_request");
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    match state.pipeline.run(entity, state.source.as_ref()).await {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => {
            let status = match e {
                PipelineError::NoData => StatusCode::NOT_FOUND,
                PipelineError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ErrorResponse::from(e))).into_response()
        }
    }
}
