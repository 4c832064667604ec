//! OCR-readiness score.
//!
//! This is an uncalibrated heuristic: a base score, a bonus for the share of
//! mid-luminance pixels (where glyph strokes and their anti-aliasing live)
//! and a bonus per enhancement step. Treat it as a ranking signal and
//! validate thresholds empirically.

use crate::preprocessing::buffer::PixelBuffer;
use crate::preprocessing::options::ConfidenceWeights;

/// Luminance band counted as likely text
const TEXT_LUMA_MIN: u8 = 50;
const TEXT_LUMA_MAX: u8 = 200;
/// Multiplier on the text ratio before capping
const TEXT_RATIO_GAIN: f32 = 2.0;

/// Score the final buffer given how many enhancement steps ran
pub fn estimate(buffer: &PixelBuffer, executed_steps: usize, weights: &ConfidenceWeights) -> f32 {
    let text_term = (text_ratio(buffer) * TEXT_RATIO_GAIN).min(weights.text_ratio_cap);
    let step_term = weights.per_step * executed_steps as f32;
    (weights.base + text_term + step_term).min(1.0)
}

/// Fraction of pixels whose luminance falls in the text band
pub fn text_ratio(buffer: &PixelBuffer) -> f32 {
    let total = buffer.pixel_count();
    if total == 0 {
        return 0.0;
    }
    let in_band = (0..buffer.height())
        .flat_map(|y| (0..buffer.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| (TEXT_LUMA_MIN..=TEXT_LUMA_MAX).contains(&buffer.luminance(x, y)))
        .count();
    (in_band as f64 / total as f64) as f32
}
