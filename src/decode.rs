//! Request byte decoding into pixel arrays

use crate::error::{PipelineError, Result};
use image::RgbImage;

/// Decode raw image bytes (PNG/JPEG) into a 3-channel RGB pixel array
///
/// The canonical channel order throughout this crate is RGB.
///
/// # Errors
/// Returns `PipelineError::Decode` when the bytes cannot be interpreted as a
/// supported image format.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let dynamic = image::load_from_memory(bytes)
        .map_err(|e| PipelineError::decode(format!("failed to decode image bytes: {e}")))?;
    Ok(dynamic.to_rgb8())
}
