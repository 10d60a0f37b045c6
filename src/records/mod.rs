pub mod merger;
pub mod store;
pub mod types;

pub use merger::HistoryMerger;
pub use store::{JsonFileRecordStore, MemoryRecordStore, RecordStore, validate_scope};
pub use types::{EntityRecord, HistoryEntry, TIMESTAMP_FORMAT};
