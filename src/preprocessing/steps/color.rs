//! Colour enhancement: red-hue targeting and the contrast tone curve.

use crate::preprocessing::buffer::{clamp_channel, PixelBuffer};

/// Light pink tint the label background is pulled toward
const LABEL_TINT: [f32; 3] = [255.0, 240.0, 240.0];
/// Blend strength of the multiply pass
const TINT_STRENGTH: f32 = 0.8;

const CURVE_GAMMA: f32 = 0.8;
const CURVE_GAIN: f32 = 1.2;

/// Multiply-blend the buffer toward the label tint.
///
/// Red ink is untouched (the tint's red channel is 255) while green and
/// blue are damped slightly, evening out background variation.
pub fn target_red_hue(mut buffer: PixelBuffer) -> PixelBuffer {
    let factors = LABEL_TINT.map(|tint| 1.0 - TINT_STRENGTH + TINT_STRENGTH * tint / 255.0);
    buffer.map_rgb(|rgb| {
        let mut out = [0u8; 3];
        for (channel, value) in rgb.iter().enumerate() {
            out[channel] = clamp_channel((*value as f32 * factors[channel]).round());
        }
        out
    });
    buffer
}

/// Gamma-and-gain tone curve applied to a single channel value
pub fn contrast_curve(value: u8) -> u8 {
    let normalized = value as f32 / 255.0;
    clamp_channel((255.0 * normalized.powf(CURVE_GAMMA) * CURVE_GAIN).floor())
}

/// Apply [`contrast_curve`] to the colour channels via a lookup table
pub fn enhance_contrast(mut buffer: PixelBuffer) -> PixelBuffer {
    let lut = contrast_lut();
    buffer.map_rgb(|rgb| rgb.map(|v| lut[v as usize]));
    buffer
}

fn contrast_lut() -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (value, entry) in lut.iter_mut().enumerate() {
        *entry = contrast_curve(value as u8);
    }
    lut
}
