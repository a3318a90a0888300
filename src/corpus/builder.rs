//! Corpus building: every transcript in a directory, one after another.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::sink::{CorpusSink, FileSink, WriteStatus};
use crate::screenplay::{extract_file, ReadError};

/// Errors that abort a corpus build
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("No documents in directory: {}", .0.display())]
    EmptyDirectory(PathBuf),

    #[error("Failed to list documents in {}: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write corpus: {0}")]
    Sink(#[from] std::io::Error),
}

/// Summary of a finished build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Documents extracted
    pub documents: usize,

    /// Bytes of dialog written
    pub bytes: usize,

    /// Times the builder waited for the sink to drain
    pub waits: usize,
}

/// List every entry of a source directory, sorted by file name.
///
/// Entries are not filtered; a subdirectory fails later as an unreadable
/// document.
pub async fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let list_err = |source| CorpusError::List {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(list_err)?;
    let mut documents = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        documents.push(entry.path());
    }

    if documents.is_empty() {
        return Err(CorpusError::EmptyDirectory(dir.to_path_buf()));
    }

    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

/// Builds a corpus from a directory of transcripts
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    source_dir: PathBuf,
}

impl CorpusBuilder {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Extract every document in order and append it to the sink.
    ///
    /// The next document is only extracted once the sink accepts more
    /// data. The first unreadable document aborts the build.
    pub async fn build<S: CorpusSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<BuildReport, CorpusError> {
        let documents = list_documents(&self.source_dir).await?;
        info!(
            "Building corpus from {} documents in {}",
            documents.len(),
            self.source_dir.display()
        );

        let mut report = BuildReport::default();

        for path in &documents {
            let dialog = extract_file(path).await?;
            debug!(path = %path.display(), bytes = dialog.len(), "Extracted document");

            report.documents += 1;
            report.bytes += dialog.len();

            if sink.write(&dialog).await? == WriteStatus::MustWait {
                report.waits += 1;
                sink.drained().await?;
            }
        }

        sink.finish().await?;

        info!(
            documents = report.documents,
            bytes = report.bytes,
            waits = report.waits,
            "Corpus build complete"
        );

        Ok(report)
    }

    /// Build straight into a file
    pub async fn build_to_file(&self, output: &Path) -> Result<BuildReport, CorpusError> {
        let mut sink = FileSink::create(output).await?;
        self.build(&mut sink).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::sink::MemorySink;
    use tempfile::TempDir;

    const EPISODE: &str = "1 INT. BRIDGE\n\n\t\t\t\t\tPICARD\n\t\t\tEngage.\n\n";

    #[tokio::test]
    async fn test_empty_directory() {
        let temp = TempDir::new().unwrap();
        let result = list_documents(temp.path()).await;
        assert!(matches!(result, Err(CorpusError::EmptyDirectory(_))));
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let result = list_documents(Path::new("/nonexistent/scripts")).await;
        assert!(matches!(result, Err(CorpusError::List { .. })));
    }

    #[tokio::test]
    async fn test_listing_is_sorted() {
        let temp = TempDir::new().unwrap();
        for name in ["102.txt", "100.txt", "101.txt"] {
            std::fs::write(temp.path().join(name), EPISODE).unwrap();
        }

        let documents = list_documents(temp.path()).await.unwrap();
        let names: Vec<_> = documents
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["100.txt", "101.txt", "102.txt"]);
    }

    #[tokio::test]
    async fn test_single_document_is_written() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("100.txt"), EPISODE).unwrap();

        let mut sink = MemorySink::new();
        let report = CorpusBuilder::new(temp.path())
            .build(&mut sink)
            .await
            .unwrap();

        assert_eq!(report.documents, 1);
        assert_eq!(sink.contents(), "PICARD: Engage. \n");
    }

    #[tokio::test]
    async fn test_subdirectory_aborts_build() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("100.txt"), EPISODE).unwrap();
        std::fs::create_dir(temp.path().join("extras")).unwrap();

        let mut sink = MemorySink::new();
        let result = CorpusBuilder::new(temp.path()).build(&mut sink).await;
        assert!(matches!(result, Err(CorpusError::Read(_))));
    }
}
