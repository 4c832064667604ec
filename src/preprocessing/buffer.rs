//! Owned pixel buffer and crop geometry shared by every preprocessing step.

use crate::error::PreprocessError;
use image::{ImageFormat, Rgba, RgbaImage};
use serde::Serialize;
use std::io::Cursor;

/// Rec. 601 luma weights
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// RGBA8 pixel grid with dimensions fixed at creation.
///
/// Steps take the buffer by value and hand back either the same buffer
/// mutated in place or a freshly allocated one, so a buffer is never
/// aliased across stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Buffer filled with a single colour
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(rgba)),
        }
    }

    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgba<u8>,
    {
        Self {
            image: RgbaImage::from_fn(width, height, f),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Rec. 601 luminance of the pixel at `(x, y)`, rounded to 0-255
    pub fn luminance(&self, x: u32, y: u32) -> u8 {
        luminance(self.image.get_pixel(x, y))
    }

    /// Apply `f` to the RGB channels of every pixel, leaving alpha alone
    pub fn map_rgb<F>(&mut self, mut f: F)
    where
        F: FnMut([u8; 3]) -> [u8; 3],
    {
        for pixel in self.image.pixels_mut() {
            let [r, g, b] = f([pixel.0[0], pixel.0[1], pixel.0[2]]);
            pixel.0[0] = r;
            pixel.0[1] = g;
            pixel.0[2] = b;
        }
    }

    /// Copy the region out into a new buffer.
    ///
    /// The region is clamped against this buffer first, so an oversized
    /// region yields the largest valid sub-rectangle.
    pub fn crop(&self, region: &CropRegion) -> PixelBuffer {
        let region = region.clamp_to(self.width(), self.height());
        let view = image::imageops::crop_imm(
            &self.image,
            region.x,
            region.y,
            region.width,
            region.height,
        );
        PixelBuffer {
            image: view.to_image(),
        }
    }

    /// Encode as PNG, for collaborators that want bytes rather than pixels
    pub fn encode_png(&self) -> Result<Vec<u8>, PreprocessError> {
        let mut bytes = Cursor::new(Vec::new());
        self.image
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| PreprocessError::Encode(e.to_string()))?;
        Ok(bytes.into_inner())
    }
}

pub(crate) fn luminance(pixel: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = pixel.0;
    let gray = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
    clamp_channel(gray.round())
}

/// Saturating float to channel conversion. NaN maps to 0.
pub(crate) fn clamp_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0) as u8
}

/// Rectangle in pixel coordinates, always inside the image it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Build a region clamped to an `image_width × image_height` image.
    ///
    /// The origin is pulled inside the image, the extent is cut at the
    /// image edge and both sides are at least 1 px for non-empty images.
    pub fn clamped(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        CropRegion {
            x,
            y,
            width,
            height,
        }
        .clamp_to(image_width, image_height)
    }

    /// Whole-image region
    pub fn full(image_width: u32, image_height: u32) -> Self {
        Self::clamped(0, 0, image_width, image_height, image_width, image_height)
    }

    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> Self {
        let x = self.x.min(image_width.saturating_sub(1));
        let y = self.y.min(image_height.saturating_sub(1));
        let width = self.width.min(image_width - x).max(1).min(image_width);
        let height = self.height.min(image_height - y).max(1).min(image_height);
        CropRegion {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_region_stays_inside_image() {
        let region = CropRegion::clamped(90, 95, 50, 50, 100, 100);
        assert_eq!(region.x, 90);
        assert_eq!(region.y, 95);
        assert_eq!(region.width, 10);
        assert_eq!(region.height, 5);
    }

    #[test]
    fn test_clamped_region_never_degenerates() {
        let region = CropRegion::clamped(0, 0, 0, 0, 40, 30);
        assert_eq!(region.width, 1);
        assert_eq!(region.height, 1);

        let region = CropRegion::clamped(500, 500, 10, 10, 40, 30);
        assert_eq!(region.x, 39);
        assert_eq!(region.y, 29);
        assert_eq!(region.area(), 1);
    }

    #[test]
    fn test_crop_produces_region_sized_buffer() {
        let buffer = PixelBuffer::from_fn(20, 10, |x, _| Rgba([x as u8 * 10, 0, 0, 255]));
        let cropped = buffer.crop(&CropRegion::clamped(5, 2, 4, 3, 20, 10));
        assert_eq!(cropped.width(), 4);
        assert_eq!(cropped.height(), 3);
        assert_eq!(cropped.pixel(0, 0), [50, 0, 0, 255]);
    }

    #[test]
    fn test_luminance_uses_rec601_weights() {
        let buffer = PixelBuffer::filled(1, 1, [255, 0, 0, 255]);
        assert_eq!(buffer.luminance(0, 0), 76);
        let buffer = PixelBuffer::filled(1, 1, [128, 128, 128, 255]);
        assert_eq!(buffer.luminance(0, 0), 128);
    }

    #[test]
    fn test_map_rgb_preserves_alpha() {
        let mut buffer = PixelBuffer::filled(2, 2, [10, 20, 30, 77]);
        buffer.map_rgb(|[r, g, b]| [b, g, r]);
        assert_eq!(buffer.pixel(1, 1), [30, 20, 10, 77]);
    }

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let buffer = PixelBuffer::filled(7, 3, [1, 2, 3, 255]);
        let bytes = buffer.encode_png().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 7);
        assert_eq!(decoded.height(), 3);
    }
}
