//! Error handling for Crusher
//!
//! Only malformed buffer shapes and configuration mistakes surface as errors.
//! Out-of-range knobs are clamped by the pipelines and never rejected.

use thiserror::Error;

/// Result type alias for Crusher operations
pub type Result<T> = std::result::Result<T, CrusherError>;

/// Main error type for Crusher operations
#[derive(Error, Debug)]
pub enum CrusherError {
    // Input Shape Errors
    #[error("Audio buffer contains no samples")]
    EmptyBuffer,

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Channel mismatch: expected {expected} samples per channel, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    // Configuration Errors
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CrusherError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            CrusherError::EmptyBuffer => "EMPTY_BUFFER",
            CrusherError::InvalidInput { .. } => "INVALID_INPUT",
            CrusherError::ChannelMismatch { .. } => "CHANNEL_MISMATCH",
            CrusherError::InvalidParameter { .. } => "INVALID_PARAMETER",
            CrusherError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for errors caused by the shape of the buffer handed to a pipeline
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CrusherError::EmptyBuffer
                | CrusherError::InvalidInput { .. }
                | CrusherError::ChannelMismatch { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            CrusherError::EmptyBuffer => vec![
                "Load audio before processing",
                "Check that the decoder produced at least one frame",
            ],
            CrusherError::InvalidInput { .. } => vec![
                "Provide at least one channel",
                "Interleaved data length must be a multiple of the channel count",
            ],
            CrusherError::ChannelMismatch { .. } => vec![
                "Every channel must hold the same number of frames",
            ],
            CrusherError::InvalidParameter { .. } => vec![
                "Valid parameters: bit_depth, downsample_factor, mix, waveshape, noise",
                "Parameter values must be numbers",
            ],
            CrusherError::Serialization(_) => vec![],
        }
    }
}
