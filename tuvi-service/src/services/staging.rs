//! Temporary on-disk staging for uploaded chart images.
//!
//! A [`StagedUpload`] owns its file: it is removed by [`StagedUpload::discard`]
//! or, if the request ends early (panic, client disconnect), by `Drop`.

use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

pub struct UploadStaging {
    dir: PathBuf,
}

impl UploadStaging {
    /// Use `dir` for staged files, creating it if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` to a fresh uniquely named file.
    ///
    /// The extension of `original_name` is kept for easier inspection.
    pub async fn stage(
        &self,
        bytes: &[u8],
        original_name: Option<&str>,
        mime_type: &str,
    ) -> std::io::Result<StagedUpload> {
        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin");

        let path = self.dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        fs::write(&path, bytes).await?;

        tracing::debug!(
            path = %path.display(),
            size = bytes.len(),
            mime_type,
            "Staged upload"
        );

        Ok(StagedUpload {
            path: Some(path),
            mime_type: mime_type.to_string(),
        })
    }
}

/// Handle to a staged file; deletes it exactly once.
#[derive(Debug)]
pub struct StagedUpload {
    path: Option<PathBuf>,
    mime_type: String,
}

impl StagedUpload {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.path {
            Some(path) => fs::read(path).await,
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "staged upload already discarded",
            )),
        }
    }

    /// Delete the staged file. Failures are logged, not returned.
    pub async fn discard(mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to delete staged upload");
            }
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to delete staged upload");
            }
        }
    }
}
