//! Per-course similarity indexes and their durable store

mod course_index;
mod store;

pub use course_index::{CourseIndex, IndexedChunk, ScoredChunk, SNAPSHOT_VERSION};
pub use store::CourseIndexStore;
