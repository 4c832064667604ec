//! Orchestrates detection, cropping and the enhancement stages.

use crate::error::PreprocessError;
use serde::Serialize;
use std::time::Instant;

use super::buffer::{CropRegion, PixelBuffer};
use super::options::PreprocessingOptions;
use super::steps;
use super::steps::load::SourceImage;
use super::steps::region::RegionDetection;

/// Log entry for one enhancement stage that ran
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingStep {
    pub name: String,
    /// Wall-clock duration; diagnostic only
    pub time_ms: u64,
}

/// Result of preprocessing one label image
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Processed label region (not serialized)
    #[serde(skip)]
    pub processed: PixelBuffer,
    pub crop_region: CropRegion,
    /// Heuristic OCR-readiness score in [0, 1]
    pub confidence: f32,
    /// Enhancement steps in execution order
    pub steps: Vec<ProcessingStep>,
    pub detection: RegionDetection,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
}

impl PreprocessingResult {
    /// Names of the executed steps, in order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name.as_str()).collect()
    }
}

/// Preprocessing pipeline configured for a single kind of run
pub struct Pipeline {
    options: PreprocessingOptions,
}

impl Pipeline {
    pub fn new(options: PreprocessingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PreprocessingOptions {
        &self.options
    }

    /// Decode and process encoded image bytes
    pub fn process(&self, source: &SourceImage) -> Result<PreprocessingResult, PreprocessError> {
        self.options.validate()?;
        let buffer = steps::load::decode(source)?;
        self.process_buffer(buffer)
    }

    /// Process an already decoded buffer
    pub fn process_buffer(
        &self,
        buffer: PixelBuffer,
    ) -> Result<PreprocessingResult, PreprocessError> {
        self.options.validate()?;
        if buffer.width() == 0 || buffer.height() == 0 {
            return Err(PreprocessError::EmptyImage {
                width: buffer.width(),
                height: buffer.height(),
            });
        }

        let start = Instant::now();
        let options = &self.options;
        let mut steps_log = Vec::new();

        let detection = steps::region::detect(&buffer, options);
        let mut img = buffer.crop(&detection.region);
        drop(buffer);

        tracing::debug!(
            "Cropped {:?} via {} strategy (red ratio {:.3})",
            detection.region,
            detection.strategy,
            detection.red_ratio
        );

        if options.target_red_hue {
            img = self.run_step(
                "red-hue-target",
                img,
                &mut steps_log,
                steps::color::target_red_hue,
            );
        }

        if options.enhance_contrast {
            img = self.run_step(
                "contrast-curve",
                img,
                &mut steps_log,
                steps::color::enhance_contrast,
            );
        }

        if options.edge_enhancement {
            let mode = options.edge_mode;
            img = self.run_step("edge-enhancement", img, &mut steps_log, |b| {
                steps::edge::enhance(b, mode)
            });
        }

        if options.morphology_operations {
            img = self.run_step("morphology", img, &mut steps_log, steps::morphology::apply);
        }

        if options.normalize_text {
            img = self.run_step(
                "histogram-normalization",
                img,
                &mut steps_log,
                steps::normalize::apply,
            );
        }

        let confidence = steps::confidence::estimate(&img, steps_log.len(), &options.confidence);
        let total_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Preprocessed label: {}x{} region at y={}, {} steps, confidence {:.2} in {}ms",
            detection.region.width,
            detection.region.height,
            detection.region.y,
            steps_log.len(),
            confidence,
            total_time_ms
        );

        Ok(PreprocessingResult {
            processed: img,
            crop_region: detection.region,
            confidence,
            steps: steps_log,
            detection,
            total_time_ms,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: PixelBuffer,
        log: &mut Vec<ProcessingStep>,
        step_fn: F,
    ) -> PixelBuffer
    where
        F: FnOnce(PixelBuffer) -> PixelBuffer,
    {
        let step_start = Instant::now();
        let result = step_fn(img);
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!("Step {} finished in {}ms", name, time_ms);
        log.push(ProcessingStep {
            name: name.to_string(),
            time_ms,
        });
        result
    }
}

/// One-shot helper: build a pipeline for `options` and run it on `source`
pub fn preprocess(
    source: &SourceImage,
    options: &PreprocessingOptions,
) -> Result<PreprocessingResult, PreprocessError> {
    Pipeline::new(options.clone()).process(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::options::CropStrategy;
    use image::Rgba;

    fn label_photo() -> PixelBuffer {
        PixelBuffer::from_fn(200, 200, |x, y| {
            if y < 30 {
                if x % 10 < 3 {
                    Rgba([250, 240, 240, 255])
                } else {
                    Rgba([250, 10, 10, 255])
                }
            } else {
                Rgba([180, 180, 180, 255])
            }
        })
    }

    #[test]
    fn test_all_steps_run_in_order_by_default() {
        let result = Pipeline::new(PreprocessingOptions::default())
            .process_buffer(label_photo())
            .unwrap();
        assert_eq!(
            result.step_names(),
            vec![
                "red-hue-target",
                "contrast-curve",
                "edge-enhancement",
                "morphology",
                "histogram-normalization"
            ]
        );
        assert!(result.confidence >= 0.85);
    }

    #[test]
    fn test_crop_only_skips_enhancement() {
        let result = Pipeline::new(PreprocessingOptions::new().crop_only())
            .process_buffer(label_photo())
            .unwrap();
        assert!(result.steps.is_empty());
        assert_eq!(result.processed.width(), result.crop_region.width);
        assert_eq!(result.processed.height(), result.crop_region.height);
        // Untouched crop keeps the source pixels
        assert_eq!(result.processed.pixel(5, 5), [250, 10, 10, 255]);
    }

    #[test]
    fn test_processed_buffer_matches_crop_size() {
        let options = PreprocessingOptions::new().crop_strategy(CropStrategy::Fixed);
        let result = Pipeline::new(options).process_buffer(label_photo()).unwrap();
        assert_eq!(result.crop_region.height, 30);
        assert_eq!(result.processed.height(), 30);
        assert_eq!(result.processed.width(), 200);
    }

    #[test]
    fn test_empty_buffer_is_an_error() {
        let pipeline = Pipeline::new(PreprocessingOptions::default());
        for (width, height) in [(0, 100), (100, 0), (0, 0)] {
            let err = pipeline
                .process_buffer(PixelBuffer::filled(width, height, [0, 0, 0, 255]))
                .unwrap_err();
            match err {
                PreprocessError::EmptyImage { width: w, height: h } => {
                    assert_eq!((w, h), (width, height));
                }
                other => panic!("expected empty image error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_tiny_buffers_stay_in_bounds() {
        let strategies = [
            CropStrategy::Entropy,
            CropStrategy::Attention,
            CropStrategy::ColorBased,
            CropStrategy::Fixed,
        ];
        for (width, height) in [(1, 1), (1, 7), (7, 1), (2, 2), (3, 1000)] {
            for strategy in strategies {
                let options = PreprocessingOptions::new().crop_strategy(strategy);
                let result = Pipeline::new(options)
                    .process_buffer(PixelBuffer::filled(width, height, [200, 30, 30, 255]))
                    .unwrap();
                let region = result.crop_region;
                assert!(region.width >= 1 && region.height >= 1);
                assert!(region.x + region.width <= width);
                assert!(region.y + region.height <= height);
                assert!((0.6..=1.0).contains(&result.confidence));
            }
        }
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let options = PreprocessingOptions::new().fixed_crop_ratio(2.0);
        let err = Pipeline::new(options).process_buffer(label_photo()).unwrap_err();
        assert!(matches!(err, PreprocessError::InvalidOptions(_)));
    }

    #[test]
    fn test_result_serializes_without_pixels() {
        let result = Pipeline::new(PreprocessingOptions::default())
            .process_buffer(label_photo())
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("processed").is_none());
        assert_eq!(json["detection"]["strategy"], "color-based");
        assert_eq!(json["steps"].as_array().unwrap().len(), 5);
    }
}
