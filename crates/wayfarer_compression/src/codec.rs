//! Thin wrappers over the `image` crate codecs and libwebp.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use wayfarer_error::{CompressionError, CompressionErrorKind};

/// Decode any supported image format.
pub fn decode(raw: &[u8]) -> Result<DynamicImage, CompressionError> {
    image::load_from_memory(raw)
        .map_err(|e| CompressionError::new(CompressionErrorKind::Decode(e.to_string())))
}

/// Dimensions that fit `(width, height)` inside the optional bounding box,
/// preserving aspect ratio and never upscaling.
///
/// # Examples
///
/// ```
/// use wayfarer_compression::fit_within;
///
/// assert_eq!(fit_within(4000, 2000, Some(1920), Some(1080)), (1920, 960));
/// assert_eq!(fit_within(800, 600, Some(1920), Some(1080)), (800, 600));
/// assert_eq!(fit_within(1000, 3000, None, Some(1500)), (500, 1500));
/// ```
pub fn fit_within(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale_w = max_width
        .filter(|&m| m > 0 && width > m)
        .map(|m| m as f64 / width as f64);
    let scale_h = max_height
        .filter(|&m| m > 0 && height > m)
        .map(|m| m as f64 / height as f64);

    let scale = match (scale_w, scale_h) {
        (None, None) => return (width, height),
        (Some(w), None) => w,
        (None, Some(h)) => h,
        (Some(w), Some(h)) => w.min(h),
    };

    let new_w = ((width as f64 * scale).round() as u32).clamp(1, width);
    let new_h = ((height as f64 * scale).round() as u32).clamp(1, height);
    (new_w, new_h)
}

/// Downscale to fit the bounding box; returns the image unchanged if it already fits.
pub(crate) fn resize_to_fit(
    image: DynamicImage,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> DynamicImage {
    let (width, height) = image.dimensions();
    let (new_w, new_h) = fit_within(width, height, max_width, max_height);
    if (new_w, new_h) == (width, height) {
        image
    } else {
        tracing::debug!(width, height, new_w, new_h, "Resizing image to fit bounds");
        image.resize_exact(new_w, new_h, FilterType::Lanczos3)
    }
}

/// Encode as lossy WebP at `quality` (1-100) through libwebp.
///
/// Images without alpha are encoded from RGB so no alpha plane is written.
/// Dimensions beyond libwebp's limit come back as an encode error.
pub fn encode_webp(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let (width, height) = image.dimensions();
    let quality = f32::from(quality.clamp(1, 100));
    let encoded = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_simple(false, quality)
    } else {
        let rgb = image.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_simple(false, quality)
    };
    encoded.map(|memory| memory.to_vec()).map_err(|e| {
        CompressionError::new(CompressionErrorKind::Encode {
            format: "webp".to_string(),
            reason: format!("{:?}", e),
        })
    })
}

/// Encode as PNG at maximum lossless compression.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, CompressionError> {
    let mut buffer = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilterType::Adaptive);
    image
        .write_with_encoder(encoder)
        .map_err(|e| encode_error("png", e))?;
    Ok(buffer)
}

/// Encode as baseline JPEG at `quality`; alpha is dropped.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| encode_error("jpeg", e))?;
    Ok(buffer)
}

fn encode_error(format: &str, err: image::ImageError) -> CompressionError {
    CompressionError::new(CompressionErrorKind::Encode {
        format: format.to_string(),
        reason: err.to_string(),
    })
}
