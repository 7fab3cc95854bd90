//! Process-wide service context
//!
//! The restoration backend and the background removers are built once at
//! startup and shared read-only into every request; there is no lazily
//! initialized global state. The ONNX sessions take `&mut self` on run, so
//! they sit behind mutexes and in-flight requests serialize on them.

use crate::config::{RemoverKind, ServiceConfig};
use crate::error::{PipelineError, Result};
use crate::inference::{restore, InferenceBackend};
use crate::normalize::NormalizedFrame;
use crate::remover::{BackgroundRemover, ChromaKeyRemover, MattingRemover};
use image::GrayImage;
use std::sync::Mutex;
use tracing::info;

/// Shared, request-scoped entry point into the pipeline
pub struct ServiceContext {
    config: ServiceConfig,
    backend: Mutex<Box<dyn InferenceBackend>>,
    chroma: Box<dyn BackgroundRemover>,
    matting: Option<Box<dyn BackgroundRemover>>,
}

impl ServiceContext {
    /// Build the context: load the restoration model and pre-warm the
    /// background removers
    ///
    /// # Errors
    /// Returns the underlying `PipelineError` when a model fails to load;
    /// the service must not start without its models.
    pub fn initialize(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        let mut backend: Box<dyn InferenceBackend> = Box::new(crate::backends::OnnxBackend::new());
        backend.initialize(&config)?;

        let matting: Option<Box<dyn BackgroundRemover>> = match &config.matting_model_path {
            Some(path) => Some(Box::new(MattingRemover::new(path, config.intra_threads)?)),
            None => None,
        };

        info!(
            input_range = %config.input_range,
            default_remover = %config.default_remover,
            matting_available = matting.is_some(),
            "service context initialized"
        );

        Ok(Self {
            config,
            backend: Mutex::new(backend),
            chroma: Box::new(ChromaKeyRemover::new()),
            matting,
        })
    }

    /// Build a context around an already-constructed backend
    ///
    /// Used by tests to inject mock backends; no matting model is loaded.
    #[must_use]
    pub fn with_backend(config: ServiceConfig, backend: Box<dyn InferenceBackend>) -> Self {
        Self::with_removers(config, backend, Box::new(ChromaKeyRemover::new()), None)
    }

    /// Build a context around pre-constructed parts
    ///
    /// Used by tests to inject mock backends and removers into both slots of
    /// the comparison path.
    #[must_use]
    pub fn with_removers(
        config: ServiceConfig,
        backend: Box<dyn InferenceBackend>,
        chroma: Box<dyn BackgroundRemover>,
        matting: Option<Box<dyn BackgroundRemover>>,
    ) -> Self {
        Self {
            config,
            backend: Mutex::new(backend),
            chroma,
            matting,
        }
    }

    /// The service configuration
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Whether the restoration backend finished initialization
    #[must_use]
    pub fn model_loaded(&self) -> bool {
        self.backend
            .lock()
            .map(|backend| backend.is_initialized())
            .unwrap_or(false)
    }

    /// Resolve a background remover by kind
    ///
    /// # Errors
    /// Returns `PipelineError::BackgroundRemoval` when the matting remover
    /// is requested but no matting model was configured.
    pub fn remover(&self, kind: RemoverKind) -> Result<&dyn BackgroundRemover> {
        match kind {
            RemoverKind::Chroma => Ok(self.chroma.as_ref()),
            RemoverKind::Matting => self
                .matting
                .as_deref()
                .ok_or_else(|| {
                    PipelineError::background_removal(
                        "matting remover requested but no matting model is configured",
                    )
                }),
        }
    }

    /// The remover used by the single-method endpoint
    ///
    /// # Errors
    /// Same as [`ServiceContext::remover`].
    pub fn default_remover(&self) -> Result<&dyn BackgroundRemover> {
        self.remover(self.config.default_remover)
    }

    /// Run a normalized frame through the restoration model
    ///
    /// # Errors
    /// Returns `PipelineError::Inference` on engine faults.
    pub fn restore_frame(&self, frame: &NormalizedFrame) -> Result<GrayImage> {
        let mut backend = self
            .backend
            .lock()
            .map_err(|_| PipelineError::internal("restoration backend mutex poisoned"))?;
        restore(backend.as_mut(), frame, self.config.input_range)
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("config", &self.config)
            .field("matting_available", &self.matting.is_some())
            .finish_non_exhaustive()
    }
}
