//! Flat on-disk store for uploaded images, keyed by original file name.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid upload file name: {0:?}")]
    InvalidName(String),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::io(&self.dir, e))
    }

    /// Writes `bytes` under the final path component of `original_name`, replacing
    /// any file of the same name. Returns the stored name.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let name = stored_name(original_name)?;
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| UploadError::io(&path, e))?;
        Ok(name)
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub async fn exists(&self, name: &str) -> bool {
        tokio::fs::try_exists(self.path_of(name))
            .await
            .unwrap_or(false)
    }

    /// Best-effort removal of every regular file in the store. Returns how many went.
    pub async fn clear(&self) -> Result<usize, UploadError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(UploadError::io(&self.dir, e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| UploadError::io(&self.dir, e))?
        {
            let path = entry.path();
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => continue,
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot stat upload; skipping");
                    continue;
                }
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "failed to delete upload"),
            }
        }
        Ok(removed)
    }
}

/// Final path component of a client-supplied name. Directory parts are dropped.
pub fn stored_name(original: &str) -> Result<String, UploadError> {
    let last = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if last.is_empty() || last == "." || last == ".." {
        return Err(UploadError::InvalidName(original.to_string()));
    }
    Ok(last.to_string())
}
