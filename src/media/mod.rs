pub mod detection;
pub mod materialize;
pub mod storage;
pub mod types;

pub use materialize::ImageMaterializer;
pub use storage::AuditImageStore;
pub use types::{ImageBatch, ImageBlob, MediaLimits};
