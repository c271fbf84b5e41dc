//! Destination for downloaded files

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Downloaded file content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// The "save to disk" side effect of a download
#[async_trait]
pub trait FileSink: Send + Sync {
    async fn save(&self, blob: &Blob) -> std::io::Result<()>;
}

/// Keeps nothing; the caller uses the returned blob directly
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

#[async_trait]
impl FileSink for DiscardSink {
    async fn save(&self, _blob: &Blob) -> std::io::Result<()> {
        Ok(())
    }
}

/// Writes each blob into a directory under its own file name
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target path for a blob; only the final path component of the name is used
    pub fn target_path(&self, file_name: &str) -> PathBuf {
        let name = Path::new(file_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "download".into());
        self.dir.join(name)
    }
}

#[async_trait]
impl FileSink for DirectorySink {
    async fn save(&self, blob: &Blob) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.target_path(&blob.file_name);
        tokio::fs::write(&path, &blob.bytes).await?;
        info!(
            "[DirectorySink] Saved {} ({} bytes)",
            path.display(),
            blob.bytes.len()
        );
        Ok(())
    }
}
