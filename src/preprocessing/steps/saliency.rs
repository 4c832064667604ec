//! Content-driven band selection for the entropy and attention crop strategies.
//!
//! Both sweep a full-width band down the image in half-band steps and keep
//! the best-scoring band. The earliest band wins ties so the result is
//! deterministic.

use crate::preprocessing::buffer::{luminance, CropRegion, PixelBuffer};
use crate::preprocessing::steps::region::Hsv;
use image::{GrayImage, Luma};
use imageproc::gradients::sobel_gradients;

/// Largest Sobel magnitude a u8 image can produce (4 * 255 * sqrt 2)
const MAX_SOBEL: f64 = 1442.5;

/// Band with the highest Shannon entropy of its luminance histogram
pub fn entropy_band(buffer: &PixelBuffer, band_height: u32) -> Option<CropRegion> {
    let gray = to_gray(buffer);
    best_band(buffer.width(), buffer.height(), band_height, |y, rows| {
        let mut histogram = [0u64; 256];
        for row in y..y + rows {
            for x in 0..gray.width() {
                histogram[gray.get_pixel(x, row).0[0] as usize] += 1;
            }
        }
        shannon_entropy(&histogram)
    })
}

/// Band with the most edge energy plus colour saturation
pub fn attention_band(buffer: &PixelBuffer, band_height: u32) -> Option<CropRegion> {
    let gradients = sobel_gradients(&to_gray(buffer));

    // Per-row sums, so each band is a cheap slice sum
    let mut row_gradient = vec![0u64; buffer.height() as usize];
    let mut row_saturation = vec![0f64; buffer.height() as usize];
    for y in 0..buffer.height() {
        for x in 0..buffer.width() {
            row_gradient[y as usize] += gradients.get_pixel(x, y).0[0] as u64;
            let [r, g, b, _] = buffer.pixel(x, y);
            row_saturation[y as usize] += Hsv::from_rgb(r, g, b).saturation as f64;
        }
    }

    let width = buffer.width() as f64;
    best_band(buffer.width(), buffer.height(), band_height, |y, rows| {
        let range = y as usize..(y + rows) as usize;
        let pixels = width * rows as f64;
        let gradient: u64 = row_gradient[range.clone()].iter().sum();
        let saturation: f64 = row_saturation[range].iter().sum();
        gradient as f64 / pixels / MAX_SOBEL + saturation / pixels / 100.0
    })
}

/// Entropy in bits of a histogram; 0 for empty or single-valued input
pub fn shannon_entropy(histogram: &[u64; 256]) -> f64 {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    histogram
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

fn to_gray(buffer: &PixelBuffer) -> GrayImage {
    let image = buffer.as_image();
    GrayImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        Luma([luminance(image.get_pixel(x, y))])
    })
}

/// Sweep bands and return the best one, or `None` if every score is zero
fn best_band<F>(width: u32, height: u32, band_height: u32, mut score: F) -> Option<CropRegion>
where
    F: FnMut(u32, u32) -> f64,
{
    if width == 0 || height == 0 {
        return None;
    }
    let rows = band_height.clamp(1, height);
    let step = (rows / 2).max(1);

    let mut starts: Vec<u32> = (0..=height - rows).step_by(step as usize).collect();
    if starts.last() != Some(&(height - rows)) {
        starts.push(height - rows);
    }

    let mut best: Option<(u32, f64)> = None;
    for y in starts {
        let value = score(y, rows);
        if best.map_or(true, |(_, top)| value > top) {
            best = Some((y, value));
        }
    }

    match best {
        Some((y, value)) if value > 0.0 => {
            tracing::debug!("Selected band at row {} (score {:.4})", y, value);
            Some(CropRegion::clamped(0, y, width, rows, width, height))
        }
        _ => None,
    }
}
