//! Fixed-geometry frame normalization
//!
//! Turns an arbitrary color image into the exact 512x512 grayscale frame the
//! restoration model expects: luma conversion, a deterministic crop around
//! the horizontal center and the bottom rows, and a bilinear resize whenever
//! clamping on small inputs leaves the crop short of the target.

use crate::error::{PipelineError, Result};
use image::{imageops, GrayImage, RgbImage};

/// Side length of a normalized frame
pub const FRAME_SIDE: u32 = 512;

/// A grayscale pixel array constrained to exactly 512x512
#[derive(Debug, Clone)]
pub struct NormalizedFrame(GrayImage);

impl NormalizedFrame {
    /// Wrap a grayscale image, enforcing the 512x512 invariant
    ///
    /// # Errors
    /// Returns `PipelineError::Internal` when the dimensions are off; callers
    /// inside this crate always go through [`normalize`], which guarantees
    /// the invariant.
    pub fn new(image: GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width != FRAME_SIDE || height != FRAME_SIDE {
            return Err(PipelineError::internal(format!(
                "normalized frame must be {FRAME_SIDE}x{FRAME_SIDE}, got {width}x{height}"
            )));
        }
        Ok(Self(image))
    }

    /// Borrow the underlying pixel array
    #[must_use]
    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    /// Consume the frame, returning the pixel array
    #[must_use]
    pub fn into_inner(self) -> GrayImage {
        self.0
    }
}

/// Compute the deterministic crop window for an input of the given size
///
/// Returns `(x, y, width, height)` in source coordinates: horizontally the
/// center +/- 256 columns, vertically the bottom 512 rows, both clamped to
/// the image bounds.
#[must_use]
pub fn crop_window(width: u32, height: u32) -> (u32, u32, u32, u32) {
    let x_center = width / 2;
    let x_start = x_center.saturating_sub(FRAME_SIDE / 2);
    let x_end = (x_center + FRAME_SIDE / 2).min(width);

    let y_start = height.saturating_sub(FRAME_SIDE);
    let y_end = height;

    (x_start, y_start, x_end - x_start, y_end - y_start)
}

/// Normalize a color image into a 512x512 grayscale frame
///
/// Pure function of its input: grayscale via the standard luma weights, the
/// deterministic crop from [`crop_window`], and a bilinear resize to the
/// target size when the clamped crop is smaller than 512 in either axis.
#[must_use]
pub fn normalize(image: &RgbImage) -> NormalizedFrame {
    let gray: GrayImage = imageops::grayscale(image);

    let (x, y, width, height) = crop_window(gray.width(), gray.height());
    let cropped = imageops::crop_imm(&gray, x, y, width, height).to_image();

    let framed = if cropped.dimensions() == (FRAME_SIDE, FRAME_SIDE) {
        cropped
    } else {
        imageops::resize(
            &cropped,
            FRAME_SIDE,
            FRAME_SIDE,
            imageops::FilterType::Triangle,
        )
    };

    // crop_window + resize guarantee the invariant, so this cannot fail
    NormalizedFrame(framed)
}
