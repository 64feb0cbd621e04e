//! Disk-backed blob store for image payloads.
//!
//! Blobs are addressed by relative path beneath a configured base directory.
//! Path construction is the caller's responsibility; this adapter only
//! validates that a path stays inside the base directory and performs the
//! raw put/get/delete operations.

use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

const MAX_BLOB_PATH_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob path")]
    InvalidPath,
    #[error("blob `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type BlobResult<T> = Result<T, BlobError>;

/// Content-addressable-by-path storage for image bytes on local disk.
///
/// The adapter does not check path uniqueness; collisions are prevented by
/// the generated-identifier scheme used by the caller.
#[derive(Clone, Debug)]
pub struct BlobStore {
    /// Base directory on disk where blobs are stored.
    pub base_path: PathBuf,
}

impl BlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Basic path validation to avoid trivial traversal vectors.
    ///
    /// Rejects empty or oversized paths, paths that begin with `/` or
    /// contain `..`, and control or backslash bytes.
    fn ensure_path_safe(path: &str) -> BlobResult<()> {
        if path.is_empty() || path.len() > MAX_BLOB_PATH_LEN {
            return Err(BlobError::InvalidPath);
        }
        if path.starts_with('/') || path.contains("..") {
            return Err(BlobError::InvalidPath);
        }
        if path
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(BlobError::InvalidPath);
        }
        Ok(())
    }

    /// Construct the fully-qualified on-disk path for a blob.
    fn blob_path(&self, path: &str) -> BlobResult<PathBuf> {
        Self::ensure_path_safe(path)?;
        Ok(self.base_path.join(path))
    }

    /// Write a blob to disk.
    ///
    /// Bytes go to a temporary file first, are fsynced, then renamed into
    /// the final location so a crash mid-write never leaves a partial blob
    /// at the addressed path.
    pub async fn put(&self, path: &str, bytes: &[u8]) -> BlobResult<()> {
        let file_path = self.blob_path(path)?;
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            BlobError::Io(io::Error::new(
                ErrorKind::Other,
                "blob path missing parent directory",
            ))
        })?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;
        if let Err(err) = file.write_all(bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobError::Io(err));
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(BlobError::Io(err));
            }
        }

        debug!("stored blob {}", file_path.display());
        Ok(())
    }

    /// Read a blob's full contents. A missing file maps to `NotFound`.
    pub async fn get(&self, path: &str) -> BlobResult<Bytes> {
        let file_path = self.blob_path(path)?;
        match fs::read(&file_path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BlobError::NotFound(path.to_string()))
            }
            Err(err) => Err(BlobError::Io(err)),
        }
    }

    /// Delete a blob. An already-missing file is treated as success; empty
    /// parent directories are pruned afterwards.
    pub async fn delete(&self, path: &str) -> BlobResult<()> {
        let file_path = self.blob_path(path)?;
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed blob {}", file_path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("blob {} already missing", file_path.display());
            }
            Err(err) => return Err(BlobError::Io(err)),
        }

        if let Some(parent) = file_path.parent() {
            self.prune_empty_dirs(parent).await;
        }
        Ok(())
    }

    /// Recursively remove empty directories up to the base path.
    ///
    /// Stops on a non-empty or missing directory, at the base, or on any
    /// unexpected I/O error.
    async fn prune_empty_dirs(&self, start: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(&self.base_path) && current != self.base_path {
            match fs::remove_dir(&current).await {
                Ok(_) => {
                    if let Some(parent) = current.parent() {
                        current = parent.to_path_buf();
                    } else {
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BlobError, BlobStore};

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        store.put("tote-1/img-1.png", b"bytes").await.unwrap();
        assert_eq!(store.get("tote-1/img-1.png").await.unwrap().as_ref(), b"bytes");

        store.delete("tote-1/img-1.png").await.unwrap();
        assert!(matches!(
            store.get("tote-1/img-1.png").await,
            Err(BlobError::NotFound(_))
        ));
        // parent directory pruned once empty
        assert!(!dir.path().join("tote-1").exists());
    }

    #[tokio::test]
    async fn delete_of_missing_blob_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        store.delete("nope/gone.png").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());
        for path in ["../escape.png", "/absolute.png", "", "a/../../b.png"] {
            assert!(matches!(
                store.get(path).await,
                Err(BlobError::InvalidPath)
            ));
        }
    }
}
