//! Error types for the reframing core.

use thiserror::Error;

/// Result type for reframing operations.
pub type ReframeResult<T> = Result<T, ReframeError>;

/// Errors that can occur while decoding detections or planning crops.
#[derive(Debug, Error)]
pub enum ReframeError {
    #[error("Malformed detector tensor: {0}")]
    MalformedTensorShape(String),

    #[error("Scene {start_frame}-{end_frame} has no samples to aggregate")]
    DegenerateSceneBounds { start_frame: u64, end_frame: u64 },

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidFrameDimensions { width: u32, height: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReframeError {
    /// Create a tensor shape error.
    pub fn malformed_tensor(message: impl Into<String>) -> Self {
        Self::MalformedTensorShape(message.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether the error only affects the current frame.
    ///
    /// Frame-local errors degrade to "no detections" instead of aborting a run.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, Self::MalformedTensorShape(_))
    }
}
