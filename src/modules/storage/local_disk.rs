//! Local filesystem storage for uploaded files
//!
//! Every stored file lives directly inside the upload directory under its
//! storage name. Files are created with create-new semantics, so an existing
//! file is never overwritten.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::core::error::{AppError, Result};

/// Byte storage for uploaded files, addressed by storage name
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Create a new, empty file for writing
    ///
    /// Fails with an `AlreadyExists` IO error if the name is taken.
    async fn create_new(&self, storage_name: &str) -> Result<fs::File>;

    /// Open a stored file for reading, returning the handle and its length
    async fn open(&self, storage_name: &str) -> Result<(fs::File, u64)>;

    /// Remove a stored file. A missing file is reported as an IO error.
    async fn remove(&self, storage_name: &str) -> Result<()>;

    /// Directory the files are stored in
    fn root(&self) -> &Path;
}

/// `FileStorage` backed by a single directory on the local disk
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    base_path: PathBuf,
}

impl LocalDiskStorage {
    /// Create the storage, creating the upload directory if it doesn't exist
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to create upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        info!("Local disk storage ready at {}", base_path.display());

        Ok(Self { base_path })
    }

    /// Resolve a storage name to its path, rejecting names that could escape the directory
    pub fn path_of(&self, storage_name: &str) -> Result<PathBuf> {
        let invalid = storage_name.is_empty()
            || storage_name == "."
            || storage_name.contains("..")
            || storage_name.contains(['/', '\\'])
            || Path::new(storage_name).is_absolute();

        if invalid {
            return Err(AppError::BadRequest(format!(
                "Invalid storage name: {}",
                storage_name
            )));
        }

        Ok(self.base_path.join(storage_name))
    }
}

#[async_trait]
impl FileStorage for LocalDiskStorage {
    async fn create_new(&self, storage_name: &str) -> Result<fs::File> {
        let path = self.path_of(storage_name)?;

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        debug!("Created {}", path.display());

        Ok(file)
    }

    async fn open(&self, storage_name: &str) -> Result<(fs::File, u64)> {
        let path = self.path_of(storage_name)?;

        let file = fs::File::open(&path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(AppError::NotFound(format!(
                "{} is not a regular file",
                storage_name
            )));
        }

        Ok((file, metadata.len()))
    }

    async fn remove(&self, storage_name: &str) -> Result<()> {
        let path = self.path_of(storage_name)?;

        fs::remove_file(&path).await?;
        debug!("Removed {}", path.display());

        Ok(())
    }

    fn root(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_new_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let storage = LocalDiskStorage::new(&nested).await.unwrap();

        assert!(nested.is_dir());
        assert_eq!(storage.root(), nested.as_path());
    }

    #[tokio::test]
    async fn test_write_open_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(dir.path()).await.unwrap();

        let mut created = storage.create_new("abc.txt").await.unwrap();
        created.write_all(b"hello").await.unwrap();
        created.sync_all().await.unwrap();
        drop(created);

        let (mut file, len) = storage.open("abc.txt").await.unwrap();
        assert_eq!(len, 5);
        let mut contents = String::new();
        file.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "hello");

        storage.remove("abc.txt").await.unwrap();
        assert!(!dir.path().join("abc.txt").exists());
    }

    #[tokio::test]
    async fn test_create_new_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(dir.path()).await.unwrap();

        std::fs::write(dir.path().join("taken.bin"), b"first").unwrap();
        let err = storage.create_new("taken.bin").await.unwrap_err();

        match err {
            AppError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::AlreadyExists),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(std::fs::read(dir.path().join("taken.bin")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalDiskStorage::new(dir.path()).await.unwrap();

        for err in [
            storage.open("nope.txt").await.unwrap_err(),
            storage.remove("nope.txt").await.unwrap_err(),
        ] {
            match err {
                AppError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_path_of_rejects_traversal() {
        let storage = LocalDiskStorage {
            base_path: PathBuf::from("/srv/uploads"),
        };

        assert_eq!(
            storage.path_of("f.pdf").unwrap(),
            PathBuf::from("/srv/uploads/f.pdf")
        );
        for name in ["", ".", "..", "../etc/passwd", "a/b", "a\\b", "/etc/passwd"] {
            assert!(
                matches!(storage.path_of(name), Err(AppError::BadRequest(_))),
                "accepted {:?}",
                name
            );
        }
    }
}
