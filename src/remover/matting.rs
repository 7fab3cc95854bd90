//! ONNX alpha-matting background removal
//!
//! Model-based variant: an external matting network (U2Net-style) predicts a
//! per-pixel alpha matte on a square, mean/std-normalized input. The matte
//! comes back with an alpha channel of its own, so this variant performs the
//! white compositing itself.

use super::{composite_over_white, BackgroundRemover};
use crate::error::{PipelineError, Result};
use crate::tensor::collapse_output;
use image::{imageops, GrayImage, RgbImage};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Square input side expected by the matting network
const MATTING_INPUT_SIDE: u32 = 320;

/// Per-channel normalization applied to the matting input
const NORMALIZATION_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const NORMALIZATION_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Alpha-matting background remover backed by an ONNX session
///
/// The session is created once and reused; `run` takes `&mut self`, so the
/// session sits behind a mutex and concurrent requests serialize on it.
pub struct MattingRemover {
    session: Mutex<Session>,
    input_side: u32,
}

impl MattingRemover {
    /// Load the matting model and pre-warm the session
    ///
    /// # Errors
    /// Returns `PipelineError::BackgroundRemoval` when the model cannot be
    /// loaded.
    pub fn new<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let path = model_path.as_ref();
        let threads = if intra_threads > 0 {
            intra_threads
        } else {
            std::thread::available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(4)
        };

        let session = Session::builder()
            .map_err(|e| {
                PipelineError::background_removal(format!("failed to create session builder: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                PipelineError::background_removal(format!("failed to set optimization level: {e}"))
            })?
            .with_intra_threads(threads)
            .map_err(|e| {
                PipelineError::background_removal(format!("failed to set intra threads: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| {
                PipelineError::background_removal(format!(
                    "failed to load matting model '{}': {e}",
                    path.display()
                ))
            })?;

        info!(model = %path.display(), "matting session initialized");

        Ok(Self {
            session: Mutex::new(session),
            input_side: MATTING_INPUT_SIDE,
        })
    }

    /// Build the (1, 3, S, S) normalized input tensor for the network
    fn input_tensor(&self, image: &RgbImage) -> Array4<f32> {
        let side = self.input_side;
        let resized = imageops::resize(image, side, side, imageops::FilterType::Triangle);

        let side = side as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for channel in 0..3 {
                let sample = f32::from(pixel.0[channel]) / 255.0;
                tensor[[0, channel, y as usize, x as usize]] =
                    (sample - NORMALIZATION_MEAN[channel]) / NORMALIZATION_STD[channel];
            }
        }
        tensor
    }

    /// Run the network and turn its raw output into an 8-bit matte
    fn predict_matte(&self, input: Array4<f32>) -> Result<GrayImage> {
        let mut session = self.session.lock().map_err(|_| {
            PipelineError::background_removal("matting session mutex poisoned")
        })?;

        let input_value = Value::from_array(input).map_err(|e| {
            PipelineError::background_removal(format!("failed to convert input tensor: {e}"))
        })?;

        let outputs = session.run(ort::inputs![input_value]).map_err(|e| {
            PipelineError::background_removal(format!("matting inference failed: {e}"))
        })?;

        let keys: Vec<_> = outputs.keys().collect();
        let first_key = keys.first().ok_or_else(|| {
            PipelineError::background_removal("matting model produced no outputs")
        })?;
        let raw = outputs
            .get(first_key)
            .ok_or_else(|| PipelineError::background_removal("first output tensor not found"))?
            .try_extract_array::<f32>()
            .map_err(|e| {
                PipelineError::background_removal(format!("failed to extract matte tensor: {e}"))
            })?;

        let matte = collapse_output(raw.view())
            .map_err(|e| PipelineError::background_removal(e.to_string()))?;
        Ok(quantize_matte(&matte))
    }
}

/// Min-max normalize a raw matte into [0, 1] and quantize to 8 bits
fn quantize_matte(matte: &ndarray::Array2<f32>) -> GrayImage {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for value in matte {
        min = min.min(*value);
        max = max.max(*value);
    }
    let span = (max - min).max(f32::EPSILON);

    let (height, width) = matte.dim();
    let mut image = GrayImage::new(width as u32, height as u32);
    for ((y, x), value) in matte.indexed_iter() {
        let alpha = (value - min) / span;
        image.put_pixel(
            x as u32,
            y as u32,
            image::Luma([(alpha * 255.0).round() as u8]),
        );
    }
    image
}

impl BackgroundRemover for MattingRemover {
    fn remove(&self, image: &RgbImage) -> Result<RgbImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::background_removal(
                "matting remover received an empty image",
            ));
        }

        let input = self.input_tensor(image);
        let matte = self.predict_matte(input)?;
        debug!(
            matte_width = matte.width(),
            matte_height = matte.height(),
            "matting network returned alpha matte"
        );

        // Alpha carries the network's canvas size; bring it back to ours
        let matte = if matte.dimensions() == image.dimensions() {
            matte
        } else {
            imageops::resize(
                &matte,
                image.width(),
                image.height(),
                imageops::FilterType::Triangle,
            )
        };

        Ok(composite_over_white(image, &matte))
    }

    fn name(&self) -> &'static str {
        "matting"
    }
}

impl std::fmt::Debug for MattingRemover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MattingRemover")
            .field("input_side", &self.input_side)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_quantize_matte_rescales_and_rounds() {
        let mut matte = Array2::<f32>::zeros((1, 3));
        matte[[0, 0]] = 2.0;
        matte[[0, 1]] = 3.0; // midpoint: alpha 0.5 * 255 = 127.5, rounds up
        matte[[0, 2]] = 4.0;

        let image = quantize_matte(&matte);
        assert_eq!(image.get_pixel(0, 0).0[0], 0);
        assert_eq!(image.get_pixel(1, 0).0[0], 128);
        assert_eq!(image.get_pixel(2, 0).0[0], 255);
    }

    #[test]
    fn test_quantize_matte_flat_input_does_not_divide_by_zero() {
        let matte = Array2::<f32>::from_elem((2, 2), 0.7);
        let image = quantize_matte(&matte);
        assert_eq!(image.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_missing_model_is_a_domain_error() {
        let result = MattingRemover::new("/nonexistent/matting.onnx", 1);
        assert!(matches!(
            result,
            Err(PipelineError::BackgroundRemoval(_))
        ));
    }
}
