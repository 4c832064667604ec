//! Preprocessing for photos of graded trading-card labels.
//!
//! The pipeline locates the label strip, crops it and enhances it for text
//! recognition. Each run is a pure function of the input bytes and options.
//!
//! ```no_run
//! use label_preprocess::{preprocess, PreprocessingOptions, SourceImage};
//!
//! # fn main() -> Result<(), label_preprocess::PreprocessError> {
//! let bytes = std::fs::read("label.jpg").expect("readable file");
//! let result = preprocess(&SourceImage::new(bytes), &PreprocessingOptions::default())?;
//! println!("{:?} at confidence {:.2}", result.crop_region, result.confidence);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod engine;
pub mod error;
pub mod preprocessing;

pub use batch::preprocess_batch;
pub use engine::{read_label, LabelReading, Recognition, TextRecognizer};
pub use error::PreprocessError;
pub use preprocessing::{
    preprocess, ConfidenceWeights, CropRegion, CropStrategy, EdgeMode, Hsv, PixelBuffer,
    Pipeline, PreprocessingOptions, PreprocessingResult, ProcessingStep, RegionDetection,
    SourceImage,
};
