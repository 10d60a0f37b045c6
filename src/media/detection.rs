#[must_use]
pub fn detect_mime(data: &[u8]) -> Option<String> {
    infer::get(data).map(|info| info.mime_type().to_string())
}

/// Whether `mime` names a raster image type.
#[must_use]
pub fn is_image_mime(mime: &str) -> bool {
    mime.parse::<mime::Mime>()
        .is_ok_and(|parsed| parsed.type_() == mime::IMAGE)
}

/// Sniff magic bytes; `None` unless they identify an image.
#[must_use]
pub fn detect_image_mime(data: &[u8]) -> Option<String> {
    detect_mime(data).filter(|mime| is_image_mime(mime))
}
