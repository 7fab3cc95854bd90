//! Tensor layout glue between pixel arrays and the inference engine
//!
//! The restoration model takes a (1, 1, 512, 512) float tensor and hands back
//! either (1, 1, H, W) or (1, H, W); these helpers do the scaling, reshaping
//! and clipping on both sides of the engine call.

use crate::config::InputRange;
use crate::error::{PipelineError, Result};
use crate::normalize::NormalizedFrame;
use image::GrayImage;
use ndarray::{Array2, Array4, ArrayViewD};

/// Build the model input tensor from a normalized frame
///
/// Samples are scaled per the configured input range and laid out as
/// (batch=1, channel=1, height, width).
#[must_use]
pub fn frame_to_tensor(frame: &NormalizedFrame, range: InputRange) -> Array4<f32> {
    let image = frame.as_image();
    let (width, height) = image.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, 1, height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        tensor[[0, 0, y as usize, x as usize]] = range.normalize(pixel.0[0]);
    }

    tensor
}

/// Collapse the engine output down to a plain (H, W) array
///
/// Accepts (1, 1, H, W), (1, H, W) and bare (H, W) shapes; anything else is
/// an inference fault.
///
/// # Errors
/// Returns `PipelineError::Inference` on unexpected output rank or leading
/// dimensions.
pub fn collapse_output(output: ArrayViewD<'_, f32>) -> Result<Array2<f32>> {
    let shape = output.shape().to_vec();
    let collapsed = match shape.as_slice() {
        [1, 1, h, w] => output
            .to_shape((*h, *w))
            .map(|a| a.to_owned())
            .map_err(|e| PipelineError::inference(format!("failed to reshape output: {e}"))),
        [1, h, w] => output
            .to_shape((*h, *w))
            .map(|a| a.to_owned())
            .map_err(|e| PipelineError::inference(format!("failed to reshape output: {e}"))),
        [h, w] => output
            .to_shape((*h, *w))
            .map(|a| a.to_owned())
            .map_err(|e| PipelineError::inference(format!("failed to reshape output: {e}"))),
        other => Err(PipelineError::inference(format!(
            "unexpected output tensor shape {other:?}"
        ))),
    }?;
    Ok(collapsed)
}

/// Denormalize a raw model output into an 8-bit grayscale image
///
/// Inverse-scales per the configured range, clips to [0, 255] and casts.
#[must_use]
pub fn tensor_to_image(output: &Array2<f32>, range: InputRange) -> GrayImage {
    let (height, width) = output.dim();
    let mut image = GrayImage::new(width as u32, height as u32);

    for ((y, x), value) in output.indexed_iter() {
        let sample = range.denormalize(*value).round().clamp(0.0, 255.0) as u8;
        image.put_pixel(x as u32, y as u32, image::Luma([sample]));
    }

    image
}
