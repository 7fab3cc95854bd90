//! Error types for the restoration pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error taxonomy for the processing pipeline
///
/// Every stage failure is recovered at the request boundary and turned into a
/// structured error payload; none of these variants is allowed to crash the
/// process.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input/output errors (model file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors raised by the image codec layer
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Request bytes could not be interpreted as a supported image format
    #[error("Decode error: {0}")]
    Decode(String),

    /// Background removal raised or returned unusable data
    #[error("Background removal failed: {0}")]
    BackgroundRemoval(String),

    /// Inference engine not ready, shape mismatch or runtime fault
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Result array could not be encoded for transport
    #[error("Encode error: {0}")]
    Encode(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new background removal error
    pub fn background_removal<S: Into<String>>(msg: S) -> Self {
        Self::BackgroundRemoval(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new encode error
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}
