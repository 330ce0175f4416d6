use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::io::csv_export::CsvArtifact;

#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to create the output directory or write a file.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded as CSV.
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    /// The in-memory CSV buffer could not be flushed.
    #[error("CSV buffer flush failed: {0}")]
    Buffer(String),
}

#[async_trait]
pub trait DataSink: Send + Sync {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink returns the paths it created; an upload sink might return
    /// object keys.
    type Output: Send;

    /// Delivers every artifact to the destination.
    async fn write(&self, artifacts: &[CsvArtifact]) -> Result<Self::Output, SinkError>;
}

/// Writes artifacts as files under one directory, creating it if needed.
/// Existing files with the same name are overwritten.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DataSink for DirectorySink {
    type Output = Vec<PathBuf>;

    async fn write(&self, artifacts: &[CsvArtifact]) -> Result<Vec<PathBuf>, SinkError> {
        if artifacts.is_empty() {
            return Ok(Vec::new());
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SinkError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let mut written = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            let path = self.dir.join(&artifact.file_name);
            tokio::fs::write(&path, &artifact.bytes)
                .await
                .map_err(|source| SinkError::Io {
                    path: path.clone(),
                    source,
                })?;
            info!(path = %path.display(), rows = artifact.rows, "wrote CSV");
            written.push(path);
        }
        Ok(written)
    }
}
