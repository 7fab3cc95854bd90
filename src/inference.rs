//! Inference backend abstraction and the restoration adapter

use crate::config::{InputRange, ServiceConfig};
use crate::error::{PipelineError, Result};
use crate::normalize::NormalizedFrame;
use crate::tensor::{frame_to_tensor, tensor_to_image};
use image::GrayImage;
use ndarray::{Array2, Array4};

/// Trait for restoration inference backends
pub trait InferenceBackend: Send {
    /// Initialize the backend with the given configuration
    ///
    /// # Errors
    /// - Backend initialization failures
    /// - Model loading or validation errors
    fn initialize(&mut self, config: &ServiceConfig) -> Result<()>;

    /// Run inference on the input tensor
    ///
    /// Returns the raw model output collapsed to (H, W); no denormalization
    /// happens here.
    ///
    /// # Errors
    /// - Backend not initialized
    /// - Model inference failures
    /// - Unexpected output tensor shape
    fn infer(&mut self, input: &Array4<f32>) -> Result<Array2<f32>>;

    /// Check if the backend is initialized
    fn is_initialized(&self) -> bool;
}

/// Run a normalized frame through the restoration model
///
/// Builds the (1, 1, 512, 512) tensor with the configured input range,
/// invokes the backend, and denormalizes the collapsed output back into an
/// 8-bit image clipped to [0, 255]. A failing engine call never produces a
/// partial result.
///
/// # Errors
/// Returns `PipelineError::Inference` on any engine fault.
pub fn restore(
    backend: &mut dyn InferenceBackend,
    frame: &NormalizedFrame,
    range: InputRange,
) -> Result<GrayImage> {
    if !backend.is_initialized() {
        return Err(PipelineError::inference("backend not initialized"));
    }

    let input = frame_to_tensor(frame, range);
    let output = backend.infer(&input)?;
    Ok(tensor_to_image(&output, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_utils::MockRestorationBackend;
    use crate::normalize::FRAME_SIDE;

    fn frame_of(value: u8) -> NormalizedFrame {
        let image = GrayImage::from_pixel(FRAME_SIDE, FRAME_SIDE, image::Luma([value]));
        NormalizedFrame::new(image).unwrap()
    }

    #[test]
    fn test_restore_identity_round_trips() {
        let mut backend = MockRestorationBackend::identity();
        backend.initialize(&ServiceConfig::default()).unwrap();

        let restored = restore(&mut backend, &frame_of(180), InputRange::SymmetricOne).unwrap();
        assert_eq!(restored.dimensions(), (FRAME_SIDE, FRAME_SIDE));
        assert_eq!(restored.get_pixel(10, 10).0[0], 180);
    }

    #[test]
    fn test_restore_requires_initialization() {
        let mut backend = MockRestorationBackend::identity();
        let result = restore(&mut backend, &frame_of(0), InputRange::ZeroToOne);
        assert!(matches!(result, Err(PipelineError::Inference(_))));
    }

    #[test]
    fn test_restore_propagates_engine_faults() {
        let mut backend = MockRestorationBackend::failing();
        backend.initialize(&ServiceConfig::default()).unwrap();
        let result = restore(&mut backend, &frame_of(0), InputRange::ZeroToOne);
        assert!(matches!(result, Err(PipelineError::Inference(_))));
    }
}
