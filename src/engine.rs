use crate::error::PreprocessError;
use crate::preprocessing::{
    preprocess, PixelBuffer, PreprocessingOptions, PreprocessingResult, SourceImage,
};

/// Raw output of a text-recognition engine
#[derive(Debug, Clone)]
pub struct Recognition {
    pub text: String,
    pub confidence: f32,
}

/// Trait implemented by text-recognition backends that consume
/// preprocessed label buffers
pub trait TextRecognizer: Send + Sync {
    /// Short, stable identifier of the recognizer backend
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognise text in a preprocessed buffer
    fn recognize(&self, buffer: &PixelBuffer) -> Result<Recognition, PreprocessError>;
}

/// Recognised label text together with both confidence signals
#[derive(Debug, Clone)]
pub struct LabelReading {
    pub text: String,
    pub ocr_confidence: f32,
    pub preprocessing: PreprocessingResult,
    /// Low preprocessing confidence or empty text: route to a human
    pub needs_review: bool,
}

/// Preprocess `source` and hand the result to `recognizer`.
///
/// A weak preprocessing score does not stop recognition; it only flags the
/// reading for secondary review.
pub fn read_label(
    recognizer: &dyn TextRecognizer,
    source: &SourceImage,
    options: &PreprocessingOptions,
    review_threshold: f32,
) -> Result<LabelReading, PreprocessError> {
    let preprocessing = preprocess(source, options)?;
    let recognition = recognizer.recognize(&preprocessing.processed)?;

    let text = recognition.text.trim().to_string();
    let needs_review = preprocessing.confidence < review_threshold || text.is_empty();
    if needs_review {
        tracing::warn!(
            "Label flagged for review: engine {}, preprocessing confidence {:.2}, {} chars",
            recognizer.name(),
            preprocessing.confidence,
            text.len()
        );
    }

    Ok(LabelReading {
        text,
        ocr_confidence: recognition.confidence,
        preprocessing,
        needs_review,
    })
}
