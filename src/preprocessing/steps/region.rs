//! Label region detection.
//!
//! Labels on graded cards carry red ink on a light strip near the top of
//! the photo, so the primary detector looks for saturated red in the upper
//! part of the image and falls back to a fixed top slice when it finds too
//! little of it.

use crate::preprocessing::buffer::{CropRegion, PixelBuffer};
use crate::preprocessing::options::{CropStrategy, PreprocessingOptions};
use crate::preprocessing::steps::saliency;
use serde::Serialize;

/// Fraction of image rows scanned for label red
const SCAN_BAND_RATIO: f32 = 0.3;
/// Minimum share of scanned pixels that must be label red
const MIN_RED_RATIO: f64 = 0.1;
/// Rows added above and below the matched band
const BAND_PADDING: u32 = 20;

/// Red hue window, wrapping around 0°
const RED_HUE_LOW: f32 = 15.0;
const RED_HUE_HIGH: f32 = 345.0;
const MIN_SATURATION: f32 = 50.0;
const MIN_VALUE: f32 = 50.0;

/// HSV sample: hue in degrees [0, 360), saturation and value in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl Hsv {
    /// Sextant-based RGB to HSV conversion
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r = r as f32 / 255.0;
        let g = g as f32 / 255.0;
        let b = b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let mut hue = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        if hue >= 360.0 {
            hue -= 360.0;
        }

        let saturation = if max == 0.0 { 0.0 } else { delta / max };

        Hsv {
            hue,
            saturation: saturation * 100.0,
            value: max * 100.0,
        }
    }

    /// Saturated, bright red of the kind printed on labels
    pub fn is_label_red(&self) -> bool {
        (self.hue <= RED_HUE_LOW || self.hue >= RED_HUE_HIGH)
            && self.saturation >= MIN_SATURATION
            && self.value >= MIN_VALUE
    }
}

/// Outcome of region detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionDetection {
    pub region: CropRegion,
    /// Strategy that actually produced `region`, after any fallback
    pub strategy: CropStrategy,
    /// Share of scanned pixels classified as label red (0 when not scanned)
    pub red_ratio: f64,
}

/// Statistics of the label-red scan over the top band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedScan {
    pub matched: u64,
    pub scanned: u64,
    pub min_row: Option<u32>,
    pub max_row: Option<u32>,
}

impl RedScan {
    pub fn ratio(&self) -> f64 {
        if self.scanned == 0 {
            0.0
        } else {
            self.matched as f64 / self.scanned as f64
        }
    }
}

/// Locate the label region. Never fails; weak signal means fixed fallback.
pub fn detect(buffer: &PixelBuffer, options: &PreprocessingOptions) -> RegionDetection {
    let fallback = || RegionDetection {
        region: fixed_region(buffer.width(), buffer.height(), options.fixed_crop_ratio),
        strategy: CropStrategy::Fixed,
        red_ratio: 0.0,
    };

    match options.crop_strategy {
        CropStrategy::Fixed => fallback(),
        CropStrategy::ColorBased => {
            let scan = scan_red(buffer);
            match color_region(&scan, buffer.width(), buffer.height()) {
                Some(region) => RegionDetection {
                    region,
                    strategy: CropStrategy::ColorBased,
                    red_ratio: scan.ratio(),
                },
                None => {
                    tracing::debug!(
                        "Red ratio {:.3} below {}, using fixed region",
                        scan.ratio(),
                        MIN_RED_RATIO
                    );
                    RegionDetection {
                        red_ratio: scan.ratio(),
                        ..fallback()
                    }
                }
            }
        }
        CropStrategy::Entropy | CropStrategy::Attention => {
            let band_height =
                fixed_region(buffer.width(), buffer.height(), options.fixed_crop_ratio).height;
            let region = if options.crop_strategy == CropStrategy::Entropy {
                saliency::entropy_band(buffer, band_height)
            } else {
                saliency::attention_band(buffer, band_height)
            };
            match region {
                Some(region) => RegionDetection {
                    region,
                    strategy: options.crop_strategy,
                    red_ratio: 0.0,
                },
                None => {
                    tracing::debug!(
                        "{} strategy found no signal, using fixed region",
                        options.crop_strategy
                    );
                    fallback()
                }
            }
        }
    }
}

/// Count label-red pixels in the top band of the image
pub fn scan_red(buffer: &PixelBuffer) -> RedScan {
    let width = buffer.width();
    let rows = ((buffer.height() as f32 * SCAN_BAND_RATIO) as u32)
        .max(1)
        .min(buffer.height());

    let mut scan = RedScan {
        matched: 0,
        scanned: 0,
        min_row: None,
        max_row: None,
    };

    for y in 0..rows {
        for x in 0..width {
            let [r, g, b, _] = buffer.pixel(x, y);
            scan.scanned += 1;
            if Hsv::from_rgb(r, g, b).is_label_red() {
                scan.matched += 1;
                scan.min_row = Some(scan.min_row.map_or(y, |row| row.min(y)));
                scan.max_row = Some(scan.max_row.map_or(y, |row| row.max(y)));
            }
        }
    }

    scan
}

/// Padded band around the matched rows, or `None` when red is too sparse
fn color_region(scan: &RedScan, width: u32, height: u32) -> Option<CropRegion> {
    if scan.ratio() <= MIN_RED_RATIO {
        return None;
    }
    let (min_row, max_row) = (scan.min_row?, scan.max_row?);

    let y = min_row.saturating_sub(BAND_PADDING);
    // A single matching row still yields a padded band; clamping keeps it >= 1
    let band = max_row.saturating_sub(min_row) + BAND_PADDING * 2;
    Some(CropRegion::clamped(0, y, width, band.min(height), width, height))
}

/// Full-width top slice, `ratio` of the image tall (at least one row)
pub fn fixed_region(width: u32, height: u32, ratio: f32) -> CropRegion {
    let rows = (height as f64 * ratio as f64).floor() as u32;
    CropRegion::clamped(0, 0, width, rows, width, height)
}
