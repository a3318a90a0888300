//! Training corpus assembly.
//!
//! Documents are processed strictly one at a time so the corpus keeps the
//! directory listing order and only one extraction is in memory at once.

pub mod builder;
pub mod sink;

pub use builder::{list_documents, BuildReport, CorpusBuilder, CorpusError};
pub use sink::{CorpusSink, FileSink, MemorySink, WriteStatus, DEFAULT_HIGH_WATER_MARK};
