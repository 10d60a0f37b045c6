use super::detection::detect_image_mime;
use super::types::{ImageBatch, ImageBlob, MediaLimits};
use crate::error::{AnalysisError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Turns transport-encoded image strings into canonical JPEG blobs.
pub struct ImageMaterializer {
    limits: MediaLimits,
}

impl ImageMaterializer {
    #[must_use]
    pub fn new(limits: MediaLimits) -> Self {
        Self { limits }
    }

    /// Decode every payload in order. The first bad entry fails the batch.
    pub fn materialize(&self, payloads: &[String]) -> Result<ImageBatch> {
        if payloads.is_empty() {
            return Err(AnalysisError::Decode("no images supplied".into()));
        }
        if payloads.len() > self.limits.max_images {
            return Err(AnalysisError::Decode(format!(
                "{} images supplied, at most {} allowed",
                payloads.len(),
                self.limits.max_images
            )));
        }

        let correlation_id = uuid::Uuid::new_v4().to_string();
        let images = payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| self.decode_one(index, payload))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            correlation_id = correlation_id.as_str(),
            images = images.len(),
            "Materialized image batch"
        );

        Ok(ImageBatch {
            correlation_id,
            images,
        })
    }

    fn decode_one(&self, index: usize, payload: &str) -> Result<ImageBlob> {
        let raw = decode_transport(payload)
            .map_err(|e| AnalysisError::Decode(format!("image {}: {e}", index + 1)))?;

        if raw.len() > self.limits.max_image_bytes {
            return Err(AnalysisError::Decode(format!(
                "image {}: {} bytes exceeds maximum {}",
                index + 1,
                raw.len(),
                self.limits.max_image_bytes
            )));
        }

        let source_mime = detect_image_mime(&raw).ok_or_else(|| {
            AnalysisError::Decode(format!("image {}: payload is not a known image type", index + 1))
        })?;

        let decoded = image::load_from_memory(&raw)
            .map_err(|e| AnalysisError::Decode(format!("image {}: {e}", index + 1)))?;

        let bytes = encode_jpeg(&decoded)
            .map_err(|e| AnalysisError::Decode(format!("image {}: re-encode failed: {e}", index + 1)))?;

        Ok(ImageBlob {
            bytes,
            mime_type: mime::IMAGE_JPEG.to_string(),
            source_mime,
            width: decoded.width(),
            height: decoded.height(),
        })
    }
}

impl Default for ImageMaterializer {
    fn default() -> Self {
        Self::new(MediaLimits::default())
    }
}

/// Strip an optional `data:<mime>;base64,` prefix and decode the remainder.
fn decode_transport(payload: &str) -> std::result::Result<Vec<u8>, String> {
    let body = match payload.trim().rsplit_once(',') {
        Some((_, body)) => body,
        None => payload.trim(),
    };
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err("empty payload".into());
    }

    STANDARD
        .decode(&compact)
        .or_else(|_| URL_SAFE.decode(&compact))
        .map_err(|e| format!("invalid base64: {e}"))
}

fn encode_jpeg(image: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    rgb.write_to(&mut out, ImageFormat::Jpeg)?;
    Ok(out.into_inner())
}
