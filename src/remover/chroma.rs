//! Heuristic chroma-distance background removal
//!
//! Model-free variant: the background color is estimated from the border
//! pixels of the frame, every pixel gets a foreground alpha from its color
//! distance to that estimate, and the result is composited over white.

use super::{composite_over_white, BackgroundRemover};
use crate::error::{PipelineError, Result};
use image::{GrayImage, RgbImage};
use tracing::debug;

/// Chroma-key background remover
///
/// `lo`/`hi` bracket the soft threshold band of the color distance: pixels
/// closer than `lo` to the background estimate are fully background, pixels
/// farther than `hi` are fully foreground, the band in between blends.
#[derive(Debug, Clone)]
pub struct ChromaKeyRemover {
    lo: f32,
    hi: f32,
}

impl Default for ChromaKeyRemover {
    fn default() -> Self {
        Self { lo: 30.0, hi: 90.0 }
    }
}

impl ChromaKeyRemover {
    /// Create a remover with the default threshold band
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a remover with a custom threshold band
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfig` when `lo >= hi`.
    pub fn with_thresholds(lo: f32, hi: f32) -> Result<Self> {
        if lo >= hi {
            return Err(PipelineError::invalid_config(
                "chroma threshold band requires lo < hi",
            ));
        }
        Ok(Self { lo, hi })
    }

    /// Estimate the background color as the per-channel mean of the border
    fn estimate_background(image: &RgbImage) -> [f32; 3] {
        let (width, height) = image.dimensions();
        let mut sums = [0.0f64; 3];
        let mut count = 0u64;

        for (x, y, pixel) in image.enumerate_pixels() {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                    *sum += f64::from(channel);
                }
                count += 1;
            }
        }

        // Images are never empty here, but guard the division anyway
        let count = count.max(1) as f64;
        [
            (sums[0] / count) as f32,
            (sums[1] / count) as f32,
            (sums[2] / count) as f32,
        ]
    }

    /// Build the per-pixel foreground matte from chroma distance
    fn matte(&self, image: &RgbImage, background: [f32; 3]) -> GrayImage {
        let mut matte = GrayImage::new(image.width(), image.height());

        for (x, y, pixel) in image.enumerate_pixels() {
            let dr = f32::from(pixel.0[0]) - background[0];
            let dg = f32::from(pixel.0[1]) - background[1];
            let db = f32::from(pixel.0[2]) - background[2];
            let distance = (dr * dr + dg * dg + db * db).sqrt();

            let alpha = ((distance - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
            matte.put_pixel(x, y, image::Luma([(alpha * 255.0).round() as u8]));
        }

        matte
    }
}

impl BackgroundRemover for ChromaKeyRemover {
    fn remove(&self, image: &RgbImage) -> Result<RgbImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PipelineError::background_removal(
                "chroma remover received an empty image",
            ));
        }

        let background = Self::estimate_background(image);
        debug!(
            r = background[0],
            g = background[1],
            b = background[2],
            "estimated background color from border"
        );

        let matte = self.matte(image, background);
        Ok(composite_over_white(image, &matte))
    }

    fn name(&self) -> &'static str {
        "chroma"
    }
}
