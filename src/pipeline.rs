//! Request pipeline orchestration
//!
//! Chains decoder output through background removal, normalization and
//! restoration, and implements the optional two-method comparison.

use crate::context::ServiceContext;
use crate::error::Result;
use crate::normalize::{normalize, NormalizedFrame};
use crate::remover::BackgroundRemover;
use image::{imageops, GrayImage, RgbImage};
use tracing::debug;

/// Result of running the pipeline with one background-removal method
#[derive(Debug)]
pub struct MethodRun {
    /// Method label ("chroma" / "matting")
    pub name: &'static str,
    /// The normalized grayscale frame fed into the model
    pub feature: NormalizedFrame,
    /// The model output, resized to the feature's shape when they differ
    pub restored: GrayImage,
    /// L2 norm between feature and restored output
    pub distance: f32,
}

/// Outcome of the two-method comparison
#[derive(Debug)]
pub struct CompareOutcome {
    /// Heuristic chroma-key run
    pub chroma: MethodRun,
    /// Matting-network run
    pub matting: MethodRun,
    /// Method with the lower distance; `None` on an exact tie
    pub better_method: Option<&'static str>,
    /// Absolute distance difference between the two methods
    pub difference: f32,
}

/// Euclidean (L2) distance between two grayscale arrays
///
/// Operates on the overlapping region: both operands are truncated to the
/// common minimum height and width first, so differing shapes can never
/// panic.
#[must_use]
pub fn euclidean_distance(a: &GrayImage, b: &GrayImage) -> f32 {
    let width = a.width().min(b.width());
    let height = a.height().min(b.height());

    let mut sum = 0.0f64;
    for y in 0..height {
        for x in 0..width {
            let diff =
                f64::from(a.get_pixel(x, y).0[0]) - f64::from(b.get_pixel(x, y).0[0]);
            sum += diff * diff;
        }
    }
    sum.sqrt() as f32
}

/// Run the single-method pipeline: remove background, normalize, restore
///
/// # Errors
/// Propagates the stage error (`BackgroundRemoval` / `Inference`) of the
/// first failing step.
pub fn process_single(
    ctx: &ServiceContext,
    image: &RgbImage,
) -> Result<(NormalizedFrame, GrayImage)> {
    let remover = ctx.default_remover()?;
    let removed = remover.remove(image)?;
    let feature = normalize(&removed);
    let restored = ctx.restore_frame(&feature)?;
    Ok((feature, restored))
}

/// Run the pipeline with an explicit background remover and score the run
///
/// The distance compares the method's own feature input against its own
/// restored output. When the model output shape differs from the feature,
/// the output is resized (bilinear) to the feature's shape first.
///
/// # Errors
/// Propagates the stage error of the first failing step.
pub fn run_method(
    ctx: &ServiceContext,
    image: &RgbImage,
    remover: &dyn BackgroundRemover,
) -> Result<MethodRun> {
    let removed = remover.remove(image)?;
    let feature = normalize(&removed);
    let restored = ctx.restore_frame(&feature)?;

    let restored = if restored.dimensions() == feature.as_image().dimensions() {
        restored
    } else {
        debug!(
            method = remover.name(),
            out_width = restored.width(),
            out_height = restored.height(),
            "resizing model output to feature shape"
        );
        imageops::resize(
            &restored,
            feature.as_image().width(),
            feature.as_image().height(),
            imageops::FilterType::Triangle,
        )
    };

    let distance = euclidean_distance(feature.as_image(), &restored);
    debug!(method = remover.name(), distance, "method run scored");

    Ok(MethodRun {
        name: remover.name(),
        feature,
        restored,
        distance,
    })
}

/// Run both background-removal methods and compare their runs
///
/// # Errors
/// Fails when either method's run fails; there is no partial comparison.
pub fn run_comparison(ctx: &ServiceContext, image: &RgbImage) -> Result<CompareOutcome> {
    let chroma = run_method(ctx, image, ctx.remover(crate::config::RemoverKind::Chroma)?)?;
    let matting = run_method(ctx, image, ctx.remover(crate::config::RemoverKind::Matting)?)?;

    let better_method = if chroma.distance < matting.distance {
        Some(chroma.name)
    } else if matting.distance < chroma.distance {
        Some(matting.name)
    } else {
        None
    };
    let difference = (chroma.distance - matting.distance).abs();

    Ok(CompareOutcome {
        chroma,
        matting,
        better_method,
        difference,
    })
}
