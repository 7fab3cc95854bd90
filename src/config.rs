//! Configuration types for the restoration service

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input normalization convention expected by the restoration model
///
/// The two trained checkpoints in circulation disagree on the input range, so
/// the convention is configurable. `SymmetricOne` matches the deployed
/// checkpoint and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputRange {
    /// Scale samples to `[0, 1]` via `x / 255`
    ZeroToOne,
    /// Scale samples to `[-1, 1]` via `x / 127.5 - 1`
    SymmetricOne,
}

impl Default for InputRange {
    fn default() -> Self {
        Self::SymmetricOne
    }
}

impl InputRange {
    /// Scale an 8-bit sample into the model input range
    #[must_use]
    pub fn normalize(self, sample: u8) -> f32 {
        match self {
            Self::ZeroToOne => f32::from(sample) / 255.0,
            Self::SymmetricOne => f32::from(sample) / 127.5 - 1.0,
        }
    }

    /// Map a model output sample back to `[0, 255]`, without clipping
    #[must_use]
    pub fn denormalize(self, sample: f32) -> f32 {
        match self {
            Self::ZeroToOne => sample * 255.0,
            Self::SymmetricOne => (sample + 1.0) / 2.0 * 255.0,
        }
    }
}

impl std::fmt::Display for InputRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroToOne => write!(f, "zero-to-one"),
            Self::SymmetricOne => write!(f, "symmetric-one"),
        }
    }
}

/// Background removal method selection
///
/// `Chroma` is the default: it needs no model file, so a bare service start
/// works out of the box. Selecting `Matting` requires a matting model path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoverKind {
    /// Heuristic chroma-distance segmentation, no model required
    Chroma,
    /// ONNX alpha-matting network with white compositing
    Matting,
}

impl Default for RemoverKind {
    fn default() -> Self {
        Self::Chroma
    }
}

impl std::fmt::Display for RemoverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chroma => write!(f, "chroma"),
            Self::Matting => write!(f, "matting"),
        }
    }
}

/// Service configuration, built once at startup
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path to the restoration model (ONNX)
    pub model_path: PathBuf,
    /// Path to the matting model (ONNX); `None` disables the matting remover
    pub matting_model_path: Option<PathBuf>,
    /// Input normalization convention for the restoration model
    pub input_range: InputRange,
    /// Remover used by the single-method endpoint
    pub default_remover: RemoverKind,
    /// Bind address for the HTTP server
    pub host: String,
    /// Bind port for the HTTP server
    pub port: u16,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
    /// Number of intra-op threads for the inference sessions (0 = auto)
    pub intra_threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/model.onnx"),
            matting_model_path: None,
            input_range: InputRange::default(),
            default_remover: RemoverKind::default(),
            host: "0.0.0.0".to_string(),
            port: 8087,
            max_body_bytes: 32 * 1024 * 1024,
            intra_threads: 0,
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfig` when a field is out of range or
    /// internally inconsistent.
    pub fn validate(&self) -> Result<()> {
        if self.model_path.as_os_str().is_empty() {
            return Err(PipelineError::invalid_config("model path must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(PipelineError::invalid_config(
                "max body size must be greater than zero",
            ));
        }
        if self.default_remover == RemoverKind::Matting && self.matting_model_path.is_none() {
            return Err(PipelineError::invalid_config(
                "matting remover selected but no matting model path configured",
            ));
        }
        Ok(())
    }
}

/// Builder for `ServiceConfig`
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
        }
    }

    #[must_use]
    pub fn model_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.model_path = path.into();
        self
    }

    #[must_use]
    pub fn matting_model_path<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.config.matting_model_path = path.map(Into::into);
        self
    }

    #[must_use]
    pub fn input_range(mut self, range: InputRange) -> Self {
        self.config.input_range = range;
        self
    }

    #[must_use]
    pub fn default_remover(mut self, remover: RemoverKind) -> Self {
        self.config.default_remover = remover;
        self
    }

    #[must_use]
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    #[must_use]
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    #[must_use]
    pub fn intra_threads(mut self, threads: usize) -> Self {
        self.config.intra_threads = threads;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfig` when validation fails.
    pub fn build(self) -> Result<ServiceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ServiceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
