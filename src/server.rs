//! HTTP surface of the restoration service
//!
//! Two POST endpoints wrap the pipeline: `/process-image` runs the default
//! background remover, `/compare-methods` runs both and scores them.
//! Request bodies carry base64-encoded image bytes; responses are JSON with
//! base64 PNG payloads.
//!
//! Error convention: every pipeline failure caught in a handler is returned
//! as HTTP 200 with an `{"error": ...}` body; the only non-200 path is the
//! top-level catch (panics and join faults map to 500). Processing time is
//! attached to success and error payloads alike.

use crate::context::ServiceContext;
use crate::decode::decode_image;
use crate::encode::{decode_base64_body, image_to_base64_png};
use crate::error::Result as PipelineResult;
use crate::pipeline::{process_single, run_comparison};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Success payload of `POST /process-image`
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// Base64 PNG of the normalized grayscale input frame
    pub processed_image: String,
    /// Base64 PNG of the model output
    pub image: String,
    /// Shape of the decoded input as (height, width, channels)
    pub original_shape: [u32; 3],
    /// Shape of the model output as (height, width)
    pub processed_shape: [u32; 2],
    /// Wall-clock handler time in seconds
    pub processing_time_seconds: f64,
}

/// Per-method section of the comparison payload
#[derive(Debug, Serialize, Deserialize)]
pub struct MethodReport {
    pub euclidean_distance: f32,
    /// Base64 PNG of this method's model output
    pub processed_image: String,
    /// Base64 PNG of this method's normalized input frame
    pub feature_image: String,
}

/// Comparison section of `POST /compare-methods`
#[derive(Debug, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub chroma: MethodReport,
    pub matting: MethodReport,
    /// Method with the lower distance; `null` on an exact tie
    pub better_method: Option<String>,
    pub difference: f32,
}

/// Success payload of `POST /compare-methods`
///
/// The top-level image fields mirror the matting run, which is the
/// service's primary method.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompareResponse {
    pub processed_image: String,
    pub feature_image: String,
    pub euclidean_distance: f32,
    pub comparison: ComparisonReport,
    pub processing_time_seconds: f64,
}

/// Error payload shared by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub processing_time_seconds: f64,
}

/// Payload of `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_loaded: bool,
}

fn handle_process(ctx: &ServiceContext, body: &[u8]) -> PipelineResult<ProcessResponse> {
    let image_bytes = decode_base64_body(body)?;
    let image = decode_image(&image_bytes)?;
    let original_shape = [image.height(), image.width(), 3];

    let (feature, restored) = process_single(ctx, &image)?;
    let processed_shape = [restored.height(), restored.width()];

    Ok(ProcessResponse {
        processed_image: image_to_base64_png(feature.as_image())?,
        image: image_to_base64_png(&restored)?,
        original_shape,
        processed_shape,
        processing_time_seconds: 0.0,
    })
}

fn handle_compare(ctx: &ServiceContext, body: &[u8]) -> PipelineResult<CompareResponse> {
    let image_bytes = decode_base64_body(body)?;
    let image = decode_image(&image_bytes)?;

    let outcome = run_comparison(ctx, &image)?;

    let chroma = MethodReport {
        euclidean_distance: outcome.chroma.distance,
        processed_image: image_to_base64_png(&outcome.chroma.restored)?,
        feature_image: image_to_base64_png(outcome.chroma.feature.as_image())?,
    };
    let matting = MethodReport {
        euclidean_distance: outcome.matting.distance,
        processed_image: image_to_base64_png(&outcome.matting.restored)?,
        feature_image: image_to_base64_png(outcome.matting.feature.as_image())?,
    };

    Ok(CompareResponse {
        processed_image: matting.processed_image.clone(),
        feature_image: matting.feature_image.clone(),
        euclidean_distance: matting.euclidean_distance,
        comparison: ComparisonReport {
            chroma,
            matting,
            better_method: outcome.better_method.map(str::to_string),
            difference: outcome.difference,
        },
        processing_time_seconds: 0.0,
    })
}

fn error_response(message: String, started: Instant) -> Response {
    (
        StatusCode::OK,
        Json(ErrorResponse {
            error: message,
            processing_time_seconds: started.elapsed().as_secs_f64(),
        }),
    )
        .into_response()
}

fn join_fault_response(started: Instant) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal server error".to_string(),
            processing_time_seconds: started.elapsed().as_secs_f64(),
        }),
    )
        .into_response()
}

async fn process_image(State(ctx): State<Arc<ServiceContext>>, body: Bytes) -> Response {
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || handle_process(&ctx, &body)).await;

    match result {
        Ok(Ok(mut payload)) => {
            payload.processing_time_seconds = started.elapsed().as_secs_f64();
            info!(
                seconds = payload.processing_time_seconds,
                "processed image"
            );
            (StatusCode::OK, Json(payload)).into_response()
        },
        Ok(Err(e)) => {
            warn!(error = %e, "image processing failed");
            error_response(e.to_string(), started)
        },
        Err(join_error) => {
            warn!(error = %join_error, "processing task aborted");
            join_fault_response(started)
        },
    }
}

async fn compare_methods(State(ctx): State<Arc<ServiceContext>>, body: Bytes) -> Response {
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || handle_compare(&ctx, &body)).await;

    match result {
        Ok(Ok(mut payload)) => {
            payload.processing_time_seconds = started.elapsed().as_secs_f64();
            info!(
                seconds = payload.processing_time_seconds,
                better = payload.comparison.better_method.as_deref().unwrap_or("tie"),
                "compared removal methods"
            );
            (StatusCode::OK, Json(payload)).into_response()
        },
        Ok(Err(e)) => {
            warn!(error = %e, "method comparison failed");
            error_response(e.to_string(), started)
        },
        Err(join_error) => {
            warn!(error = %join_error, "comparison task aborted");
            join_fault_response(started)
        },
    }
}

async fn health(State(ctx): State<Arc<ServiceContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: ctx.model_loaded(),
    })
}

fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": format!("Server error: {detail}") })),
    )
        .into_response()
}

/// Build the service router around a shared context
#[must_use]
pub fn router(ctx: Arc<ServiceContext>) -> Router {
    let max_body_bytes = ctx.config().max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/process-image", post(process_image))
        .route("/compare-methods", post(compare_methods))
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
}

/// Initialize the context and serve until shutdown
///
/// # Errors
/// Fails when the models cannot be loaded or the listener cannot bind.
pub async fn run(config: crate::config::ServiceConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let ctx = Arc::new(ServiceContext::initialize(config)?);

    let app = router(ctx);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "server listening");
    info!("  GET  /health          - health check");
    info!("  POST /process-image   - single-method pipeline");
    info!("  POST /compare-methods - two-method comparison");

    axum::serve(listener, app).await?;
    Ok(())
}
