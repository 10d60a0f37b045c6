use serde::{Deserialize, Serialize};

/// A decoded, validated image re-encoded as JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    /// Always `image/jpeg` after materialization.
    pub mime_type: String,
    /// MIME type sniffed from the payload before re-encoding.
    pub source_mime: String,
    pub width: u32,
    pub height: u32,
}

impl ImageBlob {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// An ordered set of images sharing one correlation id.
#[derive(Debug, Clone)]
pub struct ImageBatch {
    pub correlation_id: String,
    pub images: Vec<ImageBlob>,
}

impl ImageBatch {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaLimits {
    pub max_images: usize,
    pub max_image_bytes: usize,
}

impl Default for MediaLimits {
    fn default() -> Self {
        Self {
            max_images: 16,
            max_image_bytes: 20 * 1_024 * 1_024,
        }
    }
}
