//! Label image preprocessing for OCR
//!
//! Turns a photo of a graded-card label into a cropped, contrast-enhanced,
//! normalised bitmap ready for text recognition.

pub mod buffer;
pub mod options;
pub mod pipeline;
pub mod steps;

pub use buffer::{CropRegion, PixelBuffer};
pub use options::{ConfidenceWeights, CropStrategy, EdgeMode, PreprocessingOptions};
pub use pipeline::{preprocess, Pipeline, PreprocessingResult, ProcessingStep};
pub use steps::load::SourceImage;
pub use steps::region::{Hsv, RegionDetection};
