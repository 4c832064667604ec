use image::{ImageFormat, Rgb, RgbImage};
use label_preprocess::{
    preprocess, preprocess_batch, CropStrategy, EdgeMode, PixelBuffer, Pipeline,
    PreprocessError, PreprocessingOptions, SourceImage,
};
use std::io::Cursor;

fn encode(img: &RgbImage, format: ImageFormat) -> SourceImage {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, format).expect("encode fixture");
    SourceImage::new(bytes.into_inner())
}

/// 200x200 photo: 30 px red label band on top, gray card body below
fn red_band_photo() -> RgbImage {
    RgbImage::from_fn(200, 200, |_, y| {
        if y < 30 {
            Rgb([250, 10, 10])
        } else {
            Rgb([180, 180, 180])
        }
    })
}

/// Label band with light "glyphs" punched into the red
fn textured_label_photo() -> RgbImage {
    RgbImage::from_fn(240, 180, |x, y| {
        if y < 36 {
            if (x / 3) % 4 == 0 && (8..28).contains(&y) {
                Rgb([245, 235, 235])
            } else {
                Rgb([220, 25, 30])
            }
        } else {
            let shade = 120 + ((x + y) % 40) as u8;
            Rgb([shade, shade, shade.saturating_sub(10)])
        }
    })
}

#[test]
fn test_end_to_end_red_band_scenario() {
    let source = encode(&red_band_photo(), ImageFormat::Png);
    let result = preprocess(&source, &PreprocessingOptions::default()).unwrap();

    assert_eq!(result.crop_region.x, 0);
    assert_eq!(result.crop_region.y, 0);
    assert_eq!(result.crop_region.width, 200);
    assert!(
        (30..=70).contains(&result.crop_region.height),
        "height {}",
        result.crop_region.height
    );
    assert_eq!(result.detection.strategy, CropStrategy::ColorBased);

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
    assert!(result.confidence >= 0.85, "confidence {}", result.confidence);
    assert!(result.confidence <= 1.0);
}

#[test]
fn test_pipeline_is_deterministic() {
    let source = encode(&textured_label_photo(), ImageFormat::Png);
    let options = PreprocessingOptions::default();

    let first = preprocess(&source, &options).unwrap();
    let second = preprocess(&source, &options).unwrap();

    assert_eq!(first.processed, second.processed);
    assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
    assert_eq!(first.crop_region, second.crop_region);
    assert_eq!(first.step_names(), second.step_names());
}

#[test]
fn test_confidence_bounds_for_every_option_combination() {
    let source = encode(&textured_label_photo(), ImageFormat::Png);
    let strategies = [
        CropStrategy::Entropy,
        CropStrategy::Attention,
        CropStrategy::ColorBased,
        CropStrategy::Fixed,
    ];

    for mask in 0u8..32 {
        for strategy in strategies {
            let options = PreprocessingOptions::new()
                .target_red_hue(mask & 1 != 0)
                .enhance_contrast(mask & 2 != 0)
                .edge_enhancement(mask & 4 != 0)
                .morphology_operations(mask & 8 != 0)
                .normalize_text(mask & 16 != 0)
                .crop_strategy(strategy);
            let result = preprocess(&source, &options).unwrap();

            assert_eq!(result.steps.len(), mask.count_ones() as usize);
            assert!(
                (0.6..=1.0).contains(&result.confidence),
                "mask {:05b} {:?}: {}",
                mask,
                strategy,
                result.confidence
            );
        }
    }
}

#[test]
fn test_crop_region_always_inside_image() {
    let photo = textured_label_photo();
    let source = encode(&photo, ImageFormat::Png);

    for strategy in [
        CropStrategy::Entropy,
        CropStrategy::Attention,
        CropStrategy::ColorBased,
        CropStrategy::Fixed,
    ] {
        let options = PreprocessingOptions::new().crop_strategy(strategy);
        let region = preprocess(&source, &options).unwrap().crop_region;
        assert!(region.width >= 1 && region.height >= 1);
        assert!(region.x + region.width <= photo.width());
        assert!(region.y + region.height <= photo.height());
    }
}

#[test]
fn test_gray_photo_falls_back_to_fixed_region() {
    let photo = RgbImage::from_pixel(100, 100, Rgb([128, 128, 128]));
    let result = preprocess(
        &encode(&photo, ImageFormat::Png),
        &PreprocessingOptions::default(),
    )
    .unwrap();

    assert_eq!(result.detection.strategy, CropStrategy::Fixed);
    assert_eq!(result.crop_region.height, 15);
    assert_eq!(result.crop_region.width, 100);
}

#[test]
fn test_normalization_outputs_grayscale() {
    let source = encode(&textured_label_photo(), ImageFormat::Png);
    let result = preprocess(&source, &PreprocessingOptions::default()).unwrap();

    for pixel in result.processed.as_image().pixels() {
        assert_eq!(pixel.0[0], pixel.0[1]);
        assert_eq!(pixel.0[1], pixel.0[2]);
    }
}

#[test]
fn test_disabling_normalization_keeps_color() {
    let source = encode(&textured_label_photo(), ImageFormat::Png);
    let options = PreprocessingOptions::new().normalize_text(false);
    let result = preprocess(&source, &options).unwrap();

    let colorful = result
        .processed
        .as_image()
        .pixels()
        .any(|p| p.0[0] != p.0[1] || p.0[1] != p.0[2]);
    assert!(colorful);
    assert!(!result.step_names().contains(&"histogram-normalization"));
}

#[test]
fn test_laplacian_edge_mode_runs() {
    let source = encode(&textured_label_photo(), ImageFormat::Png);
    let options = PreprocessingOptions::new().edge_mode(EdgeMode::Laplacian);
    let result = preprocess(&source, &options).unwrap();
    assert_eq!(result.steps.len(), 5);
    assert_eq!(result.processed.width(), result.crop_region.width);
}

#[test]
fn test_jpeg_input() {
    let source = encode(&red_band_photo(), ImageFormat::Jpeg);
    let result = preprocess(&source, &PreprocessingOptions::default()).unwrap();
    assert_eq!(result.detection.strategy, CropStrategy::ColorBased);
    assert_eq!(result.crop_region.y, 0);
}

#[test]
fn test_corrupt_bytes_are_a_decode_error() {
    let source = encode(&red_band_photo(), ImageFormat::Png);
    let mut bytes = source.bytes()[..64].to_vec();
    // Break the PNG signature
    bytes[1] = b'X';
    let err = preprocess(&SourceImage::new(bytes), &PreprocessingOptions::default()).unwrap_err();
    match err {
        PreprocessError::Decode { byte_len, .. } => assert_eq!(byte_len, 64),
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[test]
fn test_process_buffer_skips_decoding() {
    let rgba = image::DynamicImage::ImageRgb8(red_band_photo()).to_rgba8();
    let buffer = PixelBuffer::from_image(rgba);
    let pipeline = Pipeline::new(PreprocessingOptions::default());
    let from_buffer = pipeline.process_buffer(buffer).unwrap();
    let from_bytes = pipeline
        .process(&encode(&red_band_photo(), ImageFormat::Png))
        .unwrap();
    assert_eq!(from_buffer.processed, from_bytes.processed);
}

#[tokio::test]
async fn test_batch_matches_sequential_runs() {
    let photos = [red_band_photo(), textured_label_photo()];
    let sources: Vec<SourceImage> = photos
        .iter()
        .map(|p| encode(p, ImageFormat::Png))
        .collect();
    let options = PreprocessingOptions::default();

    let sequential: Vec<_> = sources
        .iter()
        .map(|s| preprocess(s, &options).unwrap())
        .collect();
    let batch = preprocess_batch(sources, options).await;

    for (single, batched) in sequential.iter().zip(batch) {
        let batched = batched.unwrap();
        assert_eq!(single.processed, batched.processed);
        assert_eq!(single.confidence, batched.confidence);
    }
}
