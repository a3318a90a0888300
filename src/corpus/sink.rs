//! Corpus output sinks with explicit flow control.
//!
//! A write never blocks on capacity. Instead it reports whether the
//! caller may continue right away ([`WriteStatus::Ready`]) or has to wait
//! for [`CorpusSink::drained`] before producing more data.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Default buffered bytes before a sink asks the writer to wait (16 KiB)
pub const DEFAULT_HIGH_WATER_MARK: usize = 16 * 1024;

/// Outcome of a sink write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    /// The sink can take more data immediately
    Ready,

    /// The sink is over capacity; call `drained()` before writing again
    MustWait,
}

/// Append-only destination for the corpus
#[async_trait]
pub trait CorpusSink: Send {
    /// Append a chunk. The chunk is always accepted.
    async fn write(&mut self, chunk: &str) -> io::Result<WriteStatus>;

    /// Resolve once the sink has capacity again
    async fn drained(&mut self) -> io::Result<()>;

    /// Flush all remaining data
    async fn finish(&mut self) -> io::Result<()>;
}

/// File-backed sink that buffers up to a high-water mark
pub struct FileSink {
    path: PathBuf,
    file: File,
    buffer: Vec<u8>,
    high_water_mark: usize,
}

impl FileSink {
    /// Create (or truncate) the output file, creating parent directories
    pub async fn create(path: &Path) -> io::Result<Self> {
        Self::with_high_water_mark(path, DEFAULT_HIGH_WATER_MARK).await
    }

    /// Create with a custom buffer threshold
    pub async fn with_high_water_mark(path: &Path, high_water_mark: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = File::create(path).await?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            buffer: Vec::with_capacity(high_water_mark),
            high_water_mark,
        })
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CorpusSink for FileSink {
    async fn write(&mut self, chunk: &str) -> io::Result<WriteStatus> {
        self.buffer.extend_from_slice(chunk.as_bytes());

        if self.buffer.len() >= self.high_water_mark {
            Ok(WriteStatus::MustWait)
        } else {
            Ok(WriteStatus::Ready)
        }
    }

    async fn drained(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.file.write_all(&self.buffer).await?;
            self.buffer.clear();
        }
        Ok(())
    }

    async fn finish(&mut self) -> io::Result<()> {
        self.drained().await?;
        self.file.flush().await?;
        self.file.sync_all().await
    }
}

/// In-memory sink, mostly for previews and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    output: String,
    pending: usize,
    capacity: Option<usize>,
    drains: usize,
}

impl MemorySink {
    /// Unbounded sink, always ready
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink asking for a drain once `capacity` bytes are pending
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Everything written so far
    pub fn contents(&self) -> &str {
        &self.output
    }

    /// Number of times the writer waited for a drain
    pub fn drains(&self) -> usize {
        self.drains
    }

    pub fn into_inner(self) -> String {
        self.output
    }
}

#[async_trait]
impl CorpusSink for MemorySink {
    async fn write(&mut self, chunk: &str) -> io::Result<WriteStatus> {
        self.output.push_str(chunk);
        self.pending += chunk.len();

        match self.capacity {
            Some(capacity) if self.pending >= capacity => Ok(WriteStatus::MustWait),
            _ => Ok(WriteStatus::Ready),
        }
    }

    async fn drained(&mut self) -> io::Result<()> {
        self.pending = 0;
        self.drains += 1;
        Ok(())
    }

    async fn finish(&mut self) -> io::Result<()> {
        self.pending = 0;
        Ok(())
    }
}
