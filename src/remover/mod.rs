//! Background removal capability
//!
//! Two interchangeable implementations share one contract: take a color
//! image, strip the background, return a same-sized RGB image with the
//! background flattened to solid white.
//!
//! - [`ChromaKeyRemover`] is model-free; it estimates the background color
//!   from the image border and keys it out by chroma distance.
//! - [`MattingRemover`] delegates to an ONNX alpha-matting network and does
//!   the white compositing itself.

mod chroma;
mod matting;

pub use chroma::ChromaKeyRemover;
pub use matting::MattingRemover;

use crate::error::Result;
use image::{GrayImage, Rgb, RgbImage};

/// Contract for background removal implementations
pub trait BackgroundRemover: Send + Sync {
    /// Strip the background, compositing the subject onto solid white
    ///
    /// The output has the same canvas size as the input and exactly three
    /// channels; a failing implementation raises, it never hands back a
    /// black or empty frame.
    ///
    /// # Errors
    /// Returns `PipelineError::BackgroundRemoval` carrying the underlying
    /// cause.
    fn remove(&self, image: &RgbImage) -> Result<RgbImage>;

    /// Stable method label used in comparison payloads
    fn name(&self) -> &'static str;
}

/// Composite a foreground over a solid white canvas using an alpha matte
///
/// `out = fg * a + 255 * (1 - a)` per pixel and channel, with the 8-bit
/// alpha normalized to [0, 1]. The matte must have the same dimensions as
/// the foreground.
#[must_use]
pub fn composite_over_white(foreground: &RgbImage, alpha: &GrayImage) -> RgbImage {
    debug_assert_eq!(foreground.dimensions(), alpha.dimensions());
    let (width, height) = foreground.dimensions();
    let mut output = RgbImage::new(width, height);

    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let fg = foreground.get_pixel(x, y);
        let a = f32::from(alpha.get_pixel(x, y).0[0]) / 255.0;
        let blend = |c: u8| (f32::from(c) * a + 255.0 * (1.0 - a)).round() as u8;
        *pixel = Rgb([blend(fg.0[0]), blend(fg.0[1]), blend(fg.0[2])]);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    fn foreground() -> RgbImage {
        ImageBuffer::from_pixel(16, 12, Rgb([40, 80, 120]))
    }

    #[test]
    fn test_composite_fully_transparent_is_white() {
        let alpha: GrayImage = ImageBuffer::from_pixel(16, 12, Luma([0]));
        let out = composite_over_white(&foreground(), &alpha);
        for pixel in out.pixels() {
            assert_eq!(pixel, &Rgb([255, 255, 255]));
        }
    }

    #[test]
    fn test_composite_fully_opaque_is_foreground() {
        let alpha: GrayImage = ImageBuffer::from_pixel(16, 12, Luma([255]));
        let out = composite_over_white(&foreground(), &alpha);
        for pixel in out.pixels() {
            assert_eq!(pixel, &Rgb([40, 80, 120]));
        }
    }

    #[test]
    fn test_composite_half_alpha_blends() {
        let alpha: GrayImage = ImageBuffer::from_pixel(1, 1, Luma([128]));
        let fg: RgbImage = ImageBuffer::from_pixel(1, 1, Rgb([0, 0, 0]));
        let out = composite_over_white(&fg, &alpha);
        // 255 * (1 - 128/255) = 127.0
        assert_eq!(out.get_pixel(0, 0), &Rgb([127, 127, 127]));
    }
}
