//! Decode, resize, and re-encode source images

use crate::errors::ResizeError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::trace;

/// CPU-bound image transformation; called from a blocking thread
pub trait ImageTransformer: Send + Sync {
    fn transform(&self, source: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ResizeError>;
}

/// Lanczos3 resize with JPEG output
#[derive(Debug, Clone, Copy)]
pub struct JpegTransformer {
    quality: u8,
    max_dimension: u32,
}

impl JpegTransformer {
    pub fn new(quality: u8, max_dimension: u32) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            max_dimension: max_dimension.max(1),
        }
    }
}

/// Reject output sizes whose pixel buffer would exceed the configured bound
pub fn check_dimensions((width, height): (u32, u32), max_dimension: u32) -> Result<(), ResizeError> {
    if width > max_dimension || height > max_dimension {
        return Err(ResizeError::DimensionsTooLarge {
            width,
            height,
            max_dimension,
        });
    }
    Ok(())
}

/// Resolve the requested size against the source size.
///
/// A zero dimension is derived from the other one, keeping the aspect ratio.
/// Both zero keeps the source size. Results are never smaller than 1px.
pub fn target_dimensions(source: (u32, u32), requested: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    match requested {
        (0, 0) => (src_w.max(1), src_h.max(1)),
        (0, h) => (scale(src_w, h, src_h), h),
        (w, 0) => (w, scale(src_h, w, src_w)),
        (w, h) => (w, h),
    }
}

/// `value * numerator / denominator`, rounded
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return numerator.max(1);
    }
    let denominator = u64::from(denominator);
    let scaled = (u64::from(value) * u64::from(numerator) + denominator / 2) / denominator;
    u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
}

impl ImageTransformer for JpegTransformer {
    fn transform(&self, source: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ResizeError> {
        // Explicit sizes fail before any decoding work
        check_dimensions((width, height), self.max_dimension)?;
        let img = image::load_from_memory(source).map_err(ResizeError::decode)?;

        let (target_w, target_h) = target_dimensions((img.width(), img.height()), (width, height));
        check_dimensions((target_w, target_h), self.max_dimension)?;
        trace!(
            "Resizing {}x{} -> {}x{}",
            img.width(),
            img.height(),
            target_w,
            target_h
        );

        let resized = if (target_w, target_h) == (img.width(), img.height()) {
            img
        } else {
            img.resize_exact(target_w, target_h, FilterType::Lanczos3)
        };

        // JPEG has no alpha channel
        let rgb = resized.to_rgb8();
        let mut jpeg_bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg_bytes, self.quality)
            .encode_image(&rgb)
            .map_err(ResizeError::encode)?;

        Ok(jpeg_bytes)
    }
}
