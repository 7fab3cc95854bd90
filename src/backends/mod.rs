//! Backend implementations for the restoration inference engine

pub mod onnx;

// Test utilities for backend testing
#[cfg(test)]
pub mod test_utils;

pub use self::onnx::OnnxBackend;
