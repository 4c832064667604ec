//! Histogram equalisation of luminance.

use crate::preprocessing::buffer::{luminance, PixelBuffer};

/// Histogram-equalise luminance, flattening uneven lighting.
///
/// Every pixel's RGB channels receive the same equalised gray value, so the
/// output is grayscale. Alpha is left as is.
pub fn apply(mut buffer: PixelBuffer) -> PixelBuffer {
    let total = buffer.pixel_count();
    if total == 0 {
        return buffer;
    }

    let cdf = cumulative_histogram(&luminance_histogram(&buffer));
    let lut: Vec<u8> = cdf
        .iter()
        .map(|&count| ((count as f64 / total as f64) * 255.0).floor().min(255.0) as u8)
        .collect();

    buffer.map_rgb(|[r, g, b]| {
        let gray = luminance(&image::Rgba([r, g, b, 255]));
        let value = lut[gray as usize];
        [value, value, value]
    });
    buffer
}

/// 256-bin histogram of Rec. 601 luminance
pub fn luminance_histogram(buffer: &PixelBuffer) -> [u64; 256] {
    let mut histogram = [0u64; 256];
    for pixel in buffer.as_image().pixels() {
        histogram[luminance(pixel) as usize] += 1;
    }
    histogram
}

fn cumulative_histogram(histogram: &[u64; 256]) -> [u64; 256] {
    let mut cdf = [0u64; 256];
    let mut running = 0u64;
    for (bin, count) in histogram.iter().enumerate() {
        running += count;
        cdf[bin] = running;
    }
    cdf
}
