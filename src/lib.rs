#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! # bgrestore
//!
//! A small HTTP service that removes an image's background, normalizes the
//! result to a fixed 512x512 grayscale frame, runs it through a pre-trained
//! ONNX restoration model and returns the processed frames plus diagnostic
//! metrics.
//!
//! ## Pipeline
//!
//! ```text
//! bytes ──▶ decode ──▶ remove background ──▶ normalize ──▶ restore ──▶ encode
//!            (image)    (chroma | matting)    (512x512)     (ONNX)     (PNG+b64)
//! ```
//!
//! Two interchangeable background removers share one contract (white-filled
//! background, same canvas size): a model-free chroma-key heuristic and an
//! ONNX alpha-matting network. The optional comparison path runs the
//! pipeline once per remover and scores each run by the L2 distance between
//! its own input frame and its own restored output.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use bgrestore::{ServiceConfig, RemoverKind};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::builder()
//!     .model_path("./models/model.onnx")
//!     .default_remover(RemoverKind::Chroma)
//!     .port(8087)
//!     .build()?;
//! bgrestore::server::run(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! All per-request state is request-scoped; the only process-wide state is
//! the [`context::ServiceContext`] built once at startup.

pub mod backends;
pub mod config;
pub mod context;
pub mod decode;
pub mod encode;
pub mod error;
pub mod inference;
pub mod normalize;
pub mod pipeline;
pub mod remover;
pub mod server;
pub mod tensor;

// Public API exports
pub use backends::OnnxBackend;
pub use config::{InputRange, RemoverKind, ServiceConfig, ServiceConfigBuilder};
pub use context::ServiceContext;
pub use decode::decode_image;
pub use encode::{decode_base64_body, image_to_base64_png};
pub use error::{PipelineError, Result};
pub use inference::InferenceBackend;
pub use normalize::{crop_window, normalize, NormalizedFrame, FRAME_SIDE};
pub use pipeline::{euclidean_distance, run_comparison, CompareOutcome, MethodRun};
pub use remover::{BackgroundRemover, ChromaKeyRemover, MattingRemover};
pub use server::{
    CompareResponse, ComparisonReport, ErrorResponse, HealthResponse, MethodReport,
    ProcessResponse,
};
