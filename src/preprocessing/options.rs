//! Preprocessing options and configuration.

use crate::error::PreprocessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the label region is located before enhancement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropStrategy {
    /// Band with the most luminance entropy
    Entropy,
    /// Band with the most edge energy and colour saturation
    Attention,
    /// Rows containing saturated label red, near the top of the photo
    #[default]
    ColorBased,
    /// Top slice of the image, `fixed_crop_ratio` tall
    Fixed,
}

impl CropStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entropy => "entropy",
            Self::Attention => "attention",
            Self::ColorBased => "color-based",
            Self::Fixed => "fixed",
        }
    }
}

impl FromStr for CropStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entropy" => Ok(Self::Entropy),
            "attention" => Ok(Self::Attention),
            "color-based" | "color" | "colour" => Ok(Self::ColorBased),
            "fixed" => Ok(Self::Fixed),
            other => Err(format!("unknown crop strategy: {}", other)),
        }
    }
}

impl fmt::Display for CropStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge enhancement flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeMode {
    /// Single contrast/brightness/saturation pass
    #[default]
    Composite,
    /// Composite pass followed by a 3x3 Laplacian sharpen
    Laplacian,
}

impl FromStr for EdgeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "composite" => Ok(Self::Composite),
            "laplacian" | "sharpen" => Ok(Self::Laplacian),
            other => Err(format!("unknown edge mode: {}", other)),
        }
    }
}

/// Weights of the confidence heuristic.
///
/// These are tuning knobs, not calibrated probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    /// Starting score before any signal is added
    pub base: f32,
    /// Added per executed enhancement step
    pub per_step: f32,
    /// Upper bound of the text-luminance contribution
    pub text_ratio_cap: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            base: 0.6,
            per_step: 0.05,
            text_ratio_cap: 0.3,
        }
    }
}

/// Configuration for one pipeline run.
///
/// Every enhancement toggle defaults to enabled. When deserialised, any
/// omitted field takes its default value.
///
/// ```
/// use label_preprocess::{CropStrategy, PreprocessingOptions};
///
/// let options = PreprocessingOptions::new()
///     .crop_strategy(CropStrategy::Fixed)
///     .fixed_crop_ratio(0.2)
///     .normalize_text(false);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingOptions {
    pub target_red_hue: bool,
    pub enhance_contrast: bool,
    pub normalize_text: bool,
    pub crop_strategy: CropStrategy,
    pub morphology_operations: bool,
    pub edge_enhancement: bool,

    /// Height of the fixed fallback region as a fraction of image height
    pub fixed_crop_ratio: f32,

    pub edge_mode: EdgeMode,

    pub confidence: ConfidenceWeights,
}

impl Default for PreprocessingOptions {
    fn default() -> Self {
        Self {
            target_red_hue: true,
            enhance_contrast: true,
            normalize_text: true,
            crop_strategy: CropStrategy::default(),
            morphology_operations: true,
            edge_enhancement: true,
            fixed_crop_ratio: 0.15,
            edge_mode: EdgeMode::default(),
            confidence: ConfidenceWeights::default(),
        }
    }
}

impl PreprocessingOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn target_red_hue(mut self, enabled: bool) -> Self {
        self.target_red_hue = enabled;
        self
    }

    #[inline]
    pub fn enhance_contrast(mut self, enabled: bool) -> Self {
        self.enhance_contrast = enabled;
        self
    }

    #[inline]
    pub fn normalize_text(mut self, enabled: bool) -> Self {
        self.normalize_text = enabled;
        self
    }

    #[inline]
    pub fn crop_strategy(mut self, strategy: CropStrategy) -> Self {
        self.crop_strategy = strategy;
        self
    }

    #[inline]
    pub fn morphology_operations(mut self, enabled: bool) -> Self {
        self.morphology_operations = enabled;
        self
    }

    #[inline]
    pub fn edge_enhancement(mut self, enabled: bool) -> Self {
        self.edge_enhancement = enabled;
        self
    }

    #[inline]
    pub fn fixed_crop_ratio(mut self, ratio: f32) -> Self {
        self.fixed_crop_ratio = ratio;
        self
    }

    #[inline]
    pub fn edge_mode(mut self, mode: EdgeMode) -> Self {
        self.edge_mode = mode;
        self
    }

    #[inline]
    pub fn confidence_weights(mut self, weights: ConfidenceWeights) -> Self {
        self.confidence = weights;
        self
    }

    /// Disable every optional stage; only detection and cropping remain
    pub fn crop_only(self) -> Self {
        self.target_red_hue(false)
            .enhance_contrast(false)
            .edge_enhancement(false)
            .morphology_operations(false)
            .normalize_text(false)
    }

    /// Reject tunables that would make a stage meaningless
    pub fn validate(&self) -> Result<(), PreprocessError> {
        if !(self.fixed_crop_ratio > 0.0 && self.fixed_crop_ratio <= 1.0) {
            return Err(PreprocessError::InvalidOptions(format!(
                "fixed_crop_ratio must be in (0, 1], got {}",
                self.fixed_crop_ratio
            )));
        }

        let weights = &self.confidence;
        for (name, value) in [
            ("confidence.base", weights.base),
            ("confidence.per_step", weights.per_step),
            ("confidence.text_ratio_cap", weights.text_ratio_cap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PreprocessError::InvalidOptions(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
