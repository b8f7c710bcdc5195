//! Encoding paths: WebP with source-format fallback, and smaller-of-two.

use crate::codec::{decode, encode_jpeg, encode_png, encode_webp, resize_to_fit};
use crate::{CompressionOptions, CompressionResult, OutputFormat, TargetFormat};
use image::ImageFormat;
use tracing::{debug, instrument, warn};
use wayfarer_error::{CompressionError, CompressionErrorKind};

/// Re-encode `raw` along the path chosen by `options.target()`.
///
/// Never fails: on any codec error the original bytes come back with
/// `reduction_percent == 0` and `format == Unknown`.
#[instrument(skip(raw, options), fields(size = raw.len(), target = %options.target()))]
pub fn compress(raw: &[u8], options: &CompressionOptions) -> CompressionResult {
    let result = match options.target() {
        TargetFormat::WebP => compress_webp(raw, options),
        TargetFormat::Smallest => compress_smallest(raw, options),
    };
    debug!(
        original = result.original_size,
        compressed = result.compressed_size,
        reduction = result.reduction_percent,
        format = %result.format,
        "Compressed image"
    );
    result
}

/// Primary path: resize to fit, encode WebP, fall back to the source format.
pub fn compress_webp(raw: &[u8], options: &CompressionOptions) -> CompressionResult {
    let attempt = decode(raw).and_then(|image| {
        let image = resize_to_fit(image, *options.max_width(), *options.max_height());
        encode_webp(&image, options.effective_quality())
    });

    match attempt {
        Ok(buffer) => CompressionResult::encoded(raw.len(), buffer, OutputFormat::WebP),
        Err(e) => {
            debug!(error = %e, "WebP encode failed, falling back to source format");
            reencode_source_format(raw, options)
        }
    }
}

/// Fallback chain: PNG stays PNG at maximum compression, JPEG stays JPEG at
/// `quality`; anything else comes back unchanged.
pub fn reencode_source_format(raw: &[u8], options: &CompressionOptions) -> CompressionResult {
    let attempt = || -> Result<(Vec<u8>, OutputFormat), CompressionError> {
        let format = image::guess_format(raw)
            .map_err(|e| CompressionError::new(CompressionErrorKind::Decode(e.to_string())))?;
        let image = resize_to_fit(decode(raw)?, *options.max_width(), *options.max_height());
        match format {
            ImageFormat::Png => Ok((encode_png(&image)?, OutputFormat::Png)),
            ImageFormat::Jpeg => Ok((
                encode_jpeg(&image, options.effective_quality())?,
                OutputFormat::Jpeg,
            )),
            other => Err(CompressionError::new(
                CompressionErrorKind::UnsupportedFormat(format!("{:?}", other)),
            )),
        }
    };

    match attempt() {
        Ok((buffer, format)) => CompressionResult::encoded(raw.len(), buffer, format),
        Err(e) => {
            debug!(error = %e, "Fallback encode failed, keeping original bytes");
            CompressionResult::passthrough(raw)
        }
    }
}

/// Dual-candidate path: decode once, encode PNG and JPEG, keep the smaller.
///
/// Flat-colour artwork usually wins as PNG and photographs as JPEG; measuring
/// both avoids guessing from metadata. Ties go to PNG.
pub fn compress_smallest(raw: &[u8], options: &CompressionOptions) -> CompressionResult {
    let image = match decode(raw) {
        Ok(image) => resize_to_fit(image, *options.max_width(), *options.max_height()),
        Err(e) => {
            debug!(error = %e, "Decode failed, keeping original bytes");
            return CompressionResult::passthrough(raw);
        }
    };

    let png = encode_png(&image);
    let jpeg = encode_jpeg(&image, options.effective_quality());

    let (buffer, format) = match (png, jpeg) {
        (Ok(png), Ok(jpeg)) => {
            if jpeg.len() < png.len() {
                (jpeg, OutputFormat::Jpeg)
            } else {
                (png, OutputFormat::Png)
            }
        }
        (Ok(png), Err(e)) => {
            debug!(error = %e, "JPEG candidate failed");
            (png, OutputFormat::Png)
        }
        (Err(e), Ok(jpeg)) => {
            debug!(error = %e, "PNG candidate failed");
            (jpeg, OutputFormat::Jpeg)
        }
        (Err(png_err), Err(jpeg_err)) => {
            debug!(%png_err, %jpeg_err, "Both candidates failed, keeping original bytes");
            return CompressionResult::passthrough(raw);
        }
    };

    CompressionResult::encoded(raw.len(), buffer, format)
}

/// Run [`compress`] on the blocking pool so CPU-bound codec work never
/// stalls the async scheduler driving uploads.
pub async fn compress_async(raw: Vec<u8>, options: CompressionOptions) -> CompressionResult {
    let fallback_len = raw.len();
    let raw = std::sync::Arc::new(raw);
    let task_raw = raw.clone();
    match tokio::task::spawn_blocking(move || compress(&task_raw, &options)).await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, size = fallback_len, "Compression task aborted, keeping original bytes");
            CompressionResult::passthrough(&raw)
        }
    }
}
