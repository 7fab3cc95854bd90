//! ONNX Runtime backend for the restoration model
//!
//! Loads the model once at startup and runs the (1, 1, 512, 512) input
//! tensor through it. Input and output are addressed positionally; the
//! first input name is resolved once at load time for diagnostics.

use crate::config::ServiceConfig;
use crate::error::{PipelineError, Result};
use crate::inference::InferenceBackend;
use crate::tensor::collapse_output;
use ndarray::{Array2, Array4};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use tracing::{debug, info};

/// ONNX Runtime backend for running the restoration model
pub struct OnnxBackend {
    session: Option<Session>,
    input_name: Option<String>,
    initialized: bool,
}

impl OnnxBackend {
    /// Create a new, uninitialized ONNX backend
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: None,
            input_name: None,
            initialized: false,
        }
    }

    fn load_model(&mut self, config: &ServiceConfig) -> Result<()> {
        let load_start = std::time::Instant::now();

        let intra_threads = if config.intra_threads > 0 {
            config.intra_threads
        } else {
            std::thread::available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(4)
        };

        let session = Session::builder()
            .map_err(|e| {
                PipelineError::inference(format!("failed to create session builder: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                PipelineError::inference(format!("failed to set optimization level: {e}"))
            })?
            .with_intra_threads(intra_threads)
            .map_err(|e| PipelineError::inference(format!("failed to set intra threads: {e}")))?
            .commit_from_file(&config.model_path)
            .map_err(|e| {
                PipelineError::inference(format!(
                    "failed to load restoration model '{}': {e}",
                    config.model_path.display()
                ))
            })?;

        self.input_name = session.inputs().first().map(|input| input.name().to_string());
        debug!(
            input = self.input_name.as_deref().unwrap_or("<unnamed>"),
            intra_threads, "restoration session configured"
        );

        self.session = Some(session);
        self.initialized = true;

        info!(
            model = %config.model_path.display(),
            load_ms = load_start.elapsed().as_millis(),
            "restoration model loaded"
        );
        Ok(())
    }
}

impl Default for OnnxBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for OnnxBackend {
    fn initialize(&mut self, config: &ServiceConfig) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.load_model(config)
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array2<f32>> {
        if !self.initialized {
            return Err(PipelineError::inference("backend not initialized"));
        }

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| PipelineError::inference("ONNX session not initialized"))?;

        let inference_start = std::time::Instant::now();

        let input_value = Value::from_array(input.clone()).map_err(|e| {
            PipelineError::inference(format!("failed to convert input tensor: {e}"))
        })?;

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| PipelineError::inference(format!("ONNX inference failed: {e}")))?;

        // Positional output access; the model's first output is the frame
        let keys: Vec<_> = outputs.keys().collect();
        let first_key = keys
            .first()
            .ok_or_else(|| PipelineError::inference("no output tensors found"))?;
        let output_tensor = outputs
            .get(first_key)
            .ok_or_else(|| PipelineError::inference("first output tensor not found"))?
            .try_extract_array::<f32>()
            .map_err(|e| {
                PipelineError::inference(format!("failed to extract output tensor: {e}"))
            })?;

        let collapsed = collapse_output(output_tensor.view())?;

        debug!(
            inference_ms = inference_start.elapsed().as_millis(),
            output_height = collapsed.dim().0,
            output_width = collapsed.dim().1,
            "inference complete"
        );

        Ok(collapsed)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl std::fmt::Debug for OnnxBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxBackend")
            .field("initialized", &self.initialized)
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_before_initialize_fails() {
        let mut backend = OnnxBackend::new();
        let input = Array4::<f32>::zeros((1, 1, 512, 512));
        let result = backend.infer(&input);
        assert!(matches!(result, Err(PipelineError::Inference(_))));
    }

    #[test]
    fn test_initialize_with_missing_model_fails() {
        let mut backend = OnnxBackend::new();
        let config = ServiceConfig {
            model_path: "/nonexistent/model.onnx".into(),
            ..ServiceConfig::default()
        };
        let result = backend.initialize(&config);
        assert!(matches!(result, Err(PipelineError::Inference(_))));
        assert!(!backend.is_initialized());
    }

    #[test]
    fn test_initialize_with_invalid_model_bytes_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.onnx");
        std::fs::write(&path, b"not an onnx protobuf").unwrap();

        let mut backend = OnnxBackend::new();
        let config = ServiceConfig {
            model_path: path,
            ..ServiceConfig::default()
        };
        let result = backend.initialize(&config);
        assert!(matches!(result, Err(PipelineError::Inference(_))));
        assert!(!backend.is_initialized());
    }
}
