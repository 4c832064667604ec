//! Source bytes and decoding.

use crate::error::PreprocessError;
use crate::preprocessing::buffer::PixelBuffer;

/// Raw, still-encoded image bytes as received from the caller
#[derive(Debug, Clone)]
pub struct SourceImage {
    bytes: Vec<u8>,
}

impl SourceImage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decode the source into an RGBA buffer at its natural size
pub fn decode(source: &SourceImage) -> Result<PixelBuffer, PreprocessError> {
    let byte_len = source.len();
    if byte_len == 0 {
        return Err(PreprocessError::Decode {
            byte_len,
            cause: "no image data".to_string(),
        });
    }

    let image = image::load_from_memory(source.bytes()).map_err(|e| PreprocessError::Decode {
        byte_len,
        cause: e.to_string(),
    })?;

    if image.width() == 0 || image.height() == 0 {
        return Err(PreprocessError::Decode {
            byte_len,
            cause: format!("image has no pixels ({}x{})", image.width(), image.height()),
        });
    }

    tracing::debug!(
        "Decoded {} bytes into {}x{} image",
        byte_len,
        image.width(),
        image.height()
    );

    Ok(PixelBuffer::from_image(image.into_rgba8()))
}
