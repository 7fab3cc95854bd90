//! Shared fixtures for integration tests

use bgrestore::{BackgroundRemover, InferenceBackend, PipelineError, Result, ServiceConfig};
use image::{ImageBuffer, Rgb, RgbImage};
use ndarray::{Array2, Array4};
use std::io::Cursor;

/// Remover that paints the whole canvas one color
pub struct FlatRemover {
    color: Rgb<u8>,
    label: &'static str,
}

impl FlatRemover {
    pub fn new(color: Rgb<u8>, label: &'static str) -> Self {
        Self { color, label }
    }
}

impl BackgroundRemover for FlatRemover {
    fn remove(&self, image: &RgbImage) -> Result<RgbImage> {
        Ok(RgbImage::from_pixel(
            image.width(),
            image.height(),
            self.color,
        ))
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

/// Mock restoration backend driven by a closure over the input tensor
pub struct MockBackend {
    response: Box<dyn Fn(&Array4<f32>) -> Result<Array2<f32>> + Send>,
    initialized: bool,
}

impl MockBackend {
    /// Echo the input back unchanged
    pub fn identity() -> Self {
        Self {
            response: Box::new(|input| {
                let (_, _, height, width) = input.dim();
                let mut output = Array2::<f32>::zeros((height, width));
                for ((y, x), value) in output.indexed_iter_mut() {
                    *value = input[[0, 0, y, x]];
                }
                Ok(output)
            }),
            initialized: false,
        }
    }

    /// Return a constant array of the given shape, ignoring the input
    pub fn constant(height: usize, width: usize, value: f32) -> Self {
        Self {
            response: Box::new(move |_| Ok(Array2::from_elem((height, width), value))),
            initialized: false,
        }
    }

    /// Fail every inference call
    pub fn failing() -> Self {
        Self {
            response: Box::new(|_| Err(PipelineError::inference("engine unavailable"))),
            initialized: false,
        }
    }
}

impl InferenceBackend for MockBackend {
    fn initialize(&mut self, _config: &ServiceConfig) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn infer(&mut self, input: &Array4<f32>) -> Result<Array2<f32>> {
        if !self.initialized {
            return Err(PipelineError::inference("backend not initialized"));
        }
        (self.response)(input)
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// A keyable scene: green canvas with a red square subject near the bottom
pub fn test_scene(width: u32, height: u32) -> RgbImage {
    let mut img: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([20, 200, 20]));
    let x0 = width / 2;
    let y0 = height.saturating_sub(height / 3);
    for y in y0..(y0 + height / 4).min(height) {
        for x in x0..(x0 + width / 4).min(width) {
            img.put_pixel(x, y, Rgb([220, 30, 30]));
        }
    }
    img
}

/// PNG-encode a scene for request bodies
pub fn encoded_scene(width: u32, height: u32) -> Vec<u8> {
    let img = test_scene(width, height);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
