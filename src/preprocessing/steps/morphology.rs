//! Morphology simulation that thickens dark strokes.

use crate::preprocessing::buffer::{clamp_channel, luminance, PixelBuffer};
use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::translate;

const SHADOW_OFFSET: (i32, i32) = (1, 1);
const SHADOW_SIGMA: f32 = 1.0;
const SHADOW_OPACITY: f32 = 0.3;

/// Simulated erosion of the light background.
///
/// Composites a soft 1 px drop shadow of the dark ink back onto the buffer,
/// thickening thin strokes. Pixels only ever get darker.
pub fn apply(buffer: PixelBuffer) -> PixelBuffer {
    let shadow = ink_shadow(&buffer);
    let image = buffer.as_image();
    PixelBuffer::from_fn(buffer.width(), buffer.height(), |x, y| {
        let mut pixel = *image.get_pixel(x, y);
        let coverage = shadow.get_pixel(x, y).0[0] as f32 / 255.0;
        let keep = 1.0 - SHADOW_OPACITY * coverage;
        for channel in pixel.0.iter_mut().take(3) {
            *channel = clamp_channel((*channel as f32 * keep).round());
        }
        pixel
    })
}

/// Offset, blurred darkness mask of the buffer
fn ink_shadow(buffer: &PixelBuffer) -> GrayImage {
    let image = buffer.as_image();
    let ink = GrayImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        Luma([255 - luminance(image.get_pixel(x, y))])
    });
    gaussian_blur_f32(&translate(&ink, SHADOW_OFFSET), SHADOW_SIGMA)
}
