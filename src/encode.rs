//! Transport encoding of pixel arrays
//!
//! Result arrays travel inside JSON, so they are PNG-encoded (lossless) and
//! base64-wrapped. The request side carries base64-encoded image bytes and is
//! decoded here as well.

use crate::error::{PipelineError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageBuffer, Pixel, PixelWithColorType};
use std::io::Cursor;
use std::ops::Deref;

/// PNG-encode a pixel array and wrap the bytes in base64
///
/// Works for any 8-bit single- or multi-channel buffer the PNG codec accepts.
///
/// # Errors
/// Returns `PipelineError::Encode` when the codec rejects the array.
pub fn image_to_base64_png<P, C>(image: &ImageBuffer<P, C>) -> Result<String>
where
    P: Pixel<Subpixel = u8> + PixelWithColorType,
    C: Deref<Target = [u8]>,
{
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| PipelineError::encode(format!("failed to encode PNG: {e}")))?;
    Ok(STANDARD.encode(bytes))
}

/// Decode a base64 request body into raw image bytes
///
/// Surrounding ASCII whitespace is tolerated; anything else that is not
/// valid base64 is a decode failure.
///
/// # Errors
/// Returns `PipelineError::Decode` on invalid base64 input.
pub fn decode_base64_body(body: &[u8]) -> Result<Vec<u8>> {
    let trimmed: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(trimmed)
        .map_err(|e| PipelineError::decode(format!("request body is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_png_round_trip_gray() {
        let mut original = GrayImage::new(33, 17);
        for (x, y, pixel) in original.enumerate_pixels_mut() {
            *pixel = Luma([((x * 7 + y * 13) % 256) as u8]);
        }

        let encoded = image_to_base64_png(&original).unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_png_round_trip_rgb() {
        let mut original = RgbImage::new(21, 9);
        for (x, y, pixel) in original.enumerate_pixels_mut() {
            *pixel = Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
        }

        let encoded = image_to_base64_png(&original).unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_base64_body() {
        let payload = STANDARD.encode(b"hello frame");
        let decoded = decode_base64_body(payload.as_bytes()).unwrap();
        assert_eq!(decoded, b"hello frame");
    }

    #[test]
    fn test_decode_base64_body_tolerates_whitespace() {
        let payload = format!("  {}\n", STANDARD.encode(b"padded"));
        let decoded = decode_base64_body(payload.as_bytes()).unwrap();
        assert_eq!(decoded, b"padded");
    }

    #[test]
    fn test_decode_base64_body_rejects_garbage() {
        let result = decode_base64_body(b"%%%not-base64%%%");
        assert!(matches!(result, Err(PipelineError::Decode(_))));
    }
}
