//! Edge enhancement: the contrast/brightness/saturation pass and optional sharpen.

use crate::preprocessing::buffer::{clamp_channel, PixelBuffer};
use crate::preprocessing::options::EdgeMode;
use image::RgbaImage;
use imageproc::filter::filter3x3;

const CONTRAST: f32 = 1.3;
const BRIGHTNESS: f32 = 1.05;
const SATURATION: f32 = 0.7;

/// Luminance weights of the saturate matrix
const SAT_R: f32 = 0.213;
const SAT_G: f32 = 0.715;
const SAT_B: f32 = 0.072;

/// Laplacian sharpening kernel, center 5 and 4-neighbours -1
const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Sharpen glyph boundaries and mute background colour
pub fn enhance(buffer: PixelBuffer, mode: EdgeMode) -> PixelBuffer {
    let adjusted = adjust(buffer);
    match mode {
        EdgeMode::Composite => adjusted,
        EdgeMode::Laplacian => sharpen(adjusted),
    }
}

/// Contrast, brightness and saturation in one pass, clamping after each
pub fn adjust(mut buffer: PixelBuffer) -> PixelBuffer {
    buffer.map_rgb(adjust_pixel);
    buffer
}

fn adjust_pixel(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|v| {
        let contrasted = ((v as f32 - 127.5) * CONTRAST + 127.5).clamp(0.0, 255.0);
        (contrasted * BRIGHTNESS).clamp(0.0, 255.0)
    });

    let s = SATURATION;
    let out_r = (SAT_R + (1.0 - SAT_R) * s) * r + (SAT_G - SAT_G * s) * g + (SAT_B - SAT_B * s) * b;
    let out_g = (SAT_R - SAT_R * s) * r + (SAT_G + (1.0 - SAT_G) * s) * g + (SAT_B - SAT_B * s) * b;
    let out_b = (SAT_R - SAT_R * s) * r + (SAT_G - SAT_G * s) * g + (SAT_B + (1.0 - SAT_B) * s) * b;

    [
        clamp_channel(out_r.round()),
        clamp_channel(out_g.round()),
        clamp_channel(out_b.round()),
    ]
}

fn sharpen(buffer: PixelBuffer) -> PixelBuffer {
    let source = buffer.into_image();
    let mut sharpened: RgbaImage = filter3x3(&source, &SHARPEN_KERNEL);
    // Keep the original coverage; only colour channels are sharpened
    for (out, original) in sharpened.pixels_mut().zip(source.pixels()) {
        out.0[3] = original.0[3];
    }
    PixelBuffer::from_image(sharpened)
}
