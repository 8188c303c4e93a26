//! Document ingestion pipeline with multi-format parsing

mod chunker;
mod legacy;
mod normalize;
mod parser;
mod processor;

pub use chunker::{TextChunker, DOCUMENT_SEPARATOR};
pub use legacy::LegacyConverter;
pub use normalize::{normalize, word_count};
pub use parser::{FileParser, RawText};
pub use processor::{default_staging_dir, BatchOutcome, DocumentProcessor, StagedUpload};
