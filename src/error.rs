use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Failed to decode image ({byte_len} bytes): {cause}")]
    Decode { byte_len: usize, cause: String },

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Invalid preprocessing options: {0}")]
    InvalidOptions(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Text recognition failed: {0}")]
    Recognition(String),

    #[error("Preprocessing task failed: {0}")]
    TaskFailed(String),
}

impl PreprocessError {
    /// Short machine-readable code, used in CLI reports
    pub fn code(&self) -> &'static str {
        match self {
            PreprocessError::Decode { .. } => "DECODE_ERROR",
            PreprocessError::EmptyImage { .. } => "EMPTY_IMAGE",
            PreprocessError::InvalidOptions(_) => "INVALID_OPTIONS",
            PreprocessError::Encode(_) => "ENCODE_ERROR",
            PreprocessError::Recognition(_) => "RECOGNITION_ERROR",
            PreprocessError::TaskFailed(_) => "TASK_FAILED",
        }
    }
}
