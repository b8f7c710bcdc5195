//! Tests for the compression engine.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use wayfarer_compression::{
    compress, compress_async, compress_smallest, decode, encode_jpeg, encode_png,
    reduction_percent, reencode_source_format, CompressionOptions, CompressionProfiles, OutputFormat, TargetFormat,
};
use wayfarer_core::MediaCategory;

fn encode_as(image: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// Single flat colour: trivially compressible, favours PNG.
fn flat_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([30, 144, 255]))
}

/// Smooth gradients with sensor-like noise: favours JPEG.
fn photographic_image(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 0x2545_F491;
    RgbImage::from_fn(width, height, |x, y| {
        let mut noise = || {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            ((state >> 16) % 25) as i32 - 12
        };
        let r = (x * 255 / width) as i32 + noise();
        let g = (y * 255 / height) as i32 + noise();
        let b = ((x + y) * 255 / (width + height)) as i32 + noise();
        Rgb([
            r.clamp(0, 255) as u8,
            g.clamp(0, 255) as u8,
            b.clamp(0, 255) as u8,
        ])
    })
}

#[test]
fn test_garbage_input_degrades_to_original() {
    let garbage = b"<html>not an image at all</html>".to_vec();
    for target in [TargetFormat::WebP, TargetFormat::Smallest] {
        let result = compress(&garbage, &CompressionOptions::default().with_target(target));
        assert_eq!(result.buffer, garbage);
        assert_eq!(result.format, OutputFormat::Unknown);
        assert_eq!(result.reduction_percent, 0.0);
        assert_eq!(result.original_size, garbage.len());
        assert_eq!(result.compressed_size, garbage.len());
    }
}

#[test]
fn test_empty_input_degrades_to_original() {
    let result = compress(&[], &CompressionOptions::default());
    assert!(result.buffer.is_empty());
    assert_eq!(result.format, OutputFormat::Unknown);
    assert_eq!(result.reduction_percent, 0.0);
}

#[test]
fn test_webp_primary_path() {
    let source = encode_as(flat_image(64, 48), ImageFormat::Png);
    let result = compress(&source, &CompressionOptions::default());

    assert_eq!(result.format, OutputFormat::WebP);
    assert_eq!(&result.buffer[0..4], b"RIFF");
    assert_eq!(&result.buffer[8..12], b"WEBP");
    assert_eq!(result.compressed_size, result.buffer.len());
    assert_eq!(result.original_size, source.len());
    assert_eq!(decode(&result.buffer).unwrap().dimensions(), (64, 48));
}

#[test]
fn test_webp_quality_controls_size() {
    let photo = DynamicImage::ImageRgb8(photographic_image(256, 192));
    let source = encode_jpeg(&photo, 95).unwrap();

    let low = compress(&source, &CompressionOptions::default().with_quality(30));
    let high = compress(&source, &CompressionOptions::default().with_quality(90));

    assert_eq!(low.format, OutputFormat::WebP);
    assert_eq!(high.format, OutputFormat::WebP);
    assert!(
        low.compressed_size < high.compressed_size,
        "quality 30 gave {} bytes, quality 90 gave {}",
        low.compressed_size,
        high.compressed_size
    );

    let default = compress(&source, &CompressionOptions::default());
    assert!(
        default.compressed_size < source.len(),
        "photo grew from {} to {} bytes",
        source.len(),
        default.compressed_size
    );
    assert!(default.reduction_percent > 0.0);
}

#[test]
fn test_resize_fits_inside_box() {
    let source = encode_as(flat_image(400, 200), ImageFormat::Png);
    let options = CompressionOptions::bounded(80, 100, 100);
    let result = compress(&source, &options);
    assert_eq!(decode(&result.buffer).unwrap().dimensions(), (100, 50));
}

#[test]
fn test_resize_never_upscales() {
    let source = encode_as(flat_image(50, 50), ImageFormat::Png);
    let options = CompressionOptions::bounded(80, 100, 100);
    let result = compress(&source, &options);
    assert_eq!(decode(&result.buffer).unwrap().dimensions(), (50, 50));
}

#[test]
fn test_smallest_picks_png_for_flat_colour() {
    let source = encode_as(flat_image(128, 128), ImageFormat::Png);
    let options = CompressionOptions::default().with_target(TargetFormat::Smallest);

    let decoded = decode(&source).unwrap();
    let png = encode_png(&decoded).unwrap();
    let jpeg = encode_jpeg(&decoded, 80).unwrap();

    let result = compress(&source, &options);
    assert_eq!(result.compressed_size, png.len().min(jpeg.len()));
    assert_eq!(result.format, OutputFormat::Png);
}

#[test]
fn test_smallest_picks_jpeg_for_photographic() {
    let source = encode_as(photographic_image(128, 128), ImageFormat::Png);
    let options = CompressionOptions::default().with_target(TargetFormat::Smallest);

    let decoded = decode(&source).unwrap();
    let png = encode_png(&decoded).unwrap();
    let jpeg = encode_jpeg(&decoded, 80).unwrap();

    let result = compress_smallest(&source, &options);
    assert_eq!(result.compressed_size, png.len().min(jpeg.len()));
    assert_eq!(result.format, OutputFormat::Jpeg);
    assert!(result.reduction_percent > 0.0);
}

#[test]
fn test_fallback_keeps_jpeg_as_jpeg() {
    let source = encode_as(photographic_image(64, 64), ImageFormat::Jpeg);
    let result = reencode_source_format(&source, &CompressionOptions::default());
    assert_eq!(result.format, OutputFormat::Jpeg);
    assert_eq!(&result.buffer[0..3], &[0xFF, 0xD8, 0xFF]);
}

#[test]
fn test_fallback_keeps_png_as_png() {
    let source = encode_as(flat_image(64, 64), ImageFormat::Png);
    let result = reencode_source_format(&source, &CompressionOptions::default());
    assert_eq!(result.format, OutputFormat::Png);
    assert_eq!(&result.buffer[1..4], b"PNG");
}

#[test]
fn test_fallback_passes_other_formats_through() {
    let source = encode_as(flat_image(16, 16), ImageFormat::Bmp);
    let result = reencode_source_format(&source, &CompressionOptions::default());
    assert_eq!(result.format, OutputFormat::Unknown);
    assert_eq!(result.buffer, source);
    assert_eq!(result.reduction_percent, 0.0);
}

#[test]
fn test_reduction_is_reported_even_when_not_positive() {
    // A 1x1 PNG leaves almost nothing to win; whatever the sign, it is reported.
    let source = encode_as(flat_image(1, 1), ImageFormat::Png);
    let result = compress(&source, &CompressionOptions::default());
    assert_eq!(result.format, OutputFormat::WebP);
    assert_eq!(
        result.reduction_percent,
        reduction_percent(source.len(), result.compressed_size)
    );
}

#[test]
fn test_category_profiles() {
    let profiles = CompressionProfiles::default();
    assert_eq!(*profiles.get(MediaCategory::Highlights).max_width(), Some(1200));
    assert_eq!(*profiles.get(MediaCategory::Accommodations).quality(), 82);
}

#[test]
fn test_quality_is_clamped() {
    assert_eq!(CompressionOptions::default().with_quality(0).effective_quality(), 80);
    assert_eq!(CompressionOptions::default().with_quality(250).effective_quality(), 100);
}

#[tokio::test]
async fn test_compress_async_matches_sync() {
    let source = encode_as(flat_image(32, 32), ImageFormat::Png);
    let options = CompressionOptions::default();
    let expected = compress(&source, &options);
    let actual = compress_async(source, options).await;
    assert_eq!(actual, expected);
}
