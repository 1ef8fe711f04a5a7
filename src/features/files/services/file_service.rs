use bytes::Bytes;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::FileRecord;
use crate::features::files::services::MetadataStore;
use crate::modules::storage::FileStorage;
use crate::shared::constants::{MAX_STORAGE_NAME_ATTEMPTS, MULTIPART_OVERHEAD_BYTES, UNNAMED_FILE};
use crate::shared::validation::storage_extension;

/// An opened stored file together with its metadata
#[derive(Debug)]
pub struct FileDownload {
    pub record: FileRecord,
    pub file: fs::File,
    pub len: u64,
}

/// An upload being streamed to disk under a fresh storage name
#[derive(Debug)]
pub struct PendingUpload {
    original_name: String,
    extension: String,
    target: Option<(String, fs::File)>,
    written: u64,
}

/// Service for file operations
///
/// Writes file bytes through `FileStorage` and keeps `MetadataStore` in step
/// with what is on disk.
pub struct FileService {
    store: Arc<MetadataStore>,
    storage: Arc<dyn FileStorage>,
    max_file_size: u64,
}

impl FileService {
    pub fn new(store: Arc<MetadataStore>, storage: Arc<dyn FileStorage>, max_file_size: u64) -> Self {
        Self {
            store,
            storage,
            max_file_size,
        }
    }

    /// Request body limit for the upload route
    pub fn upload_body_limit(&self) -> usize {
        usize::try_from(self.max_file_size)
            .unwrap_or(usize::MAX)
            .saturating_add(MULTIPART_OVERHEAD_BYTES)
    }

    /// Reject sizes above the configured maximum
    pub fn ensure_within_limit(&self, size: u64) -> Result<()> {
        if size > self.max_file_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} bytes ({} MB)",
                self.max_file_size,
                self.max_file_size / 1024 / 1024
            )));
        }
        Ok(())
    }

    /// Start streaming an upload to disk
    ///
    /// No file is created until the first chunk that fits within the size limit.
    pub fn begin_upload(&self, original_name: &str) -> PendingUpload {
        let original_name = if original_name.trim().is_empty() {
            UNNAMED_FILE
        } else {
            original_name
        };

        PendingUpload {
            original_name: original_name.to_string(),
            extension: storage_extension(original_name),
            target: None,
            written: 0,
        }
    }

    /// Append a chunk to the upload, rejecting it if the total would exceed the limit
    ///
    /// A rejected chunk is never written. The caller should `abort_upload` on error.
    pub async fn write_chunk(&self, upload: &mut PendingUpload, chunk: Bytes) -> Result<()> {
        self.ensure_within_limit(upload.written + chunk.len() as u64)?;
        if chunk.is_empty() {
            return Ok(());
        }

        self.ensure_target(upload).await?;
        if let Some((_, file)) = upload.target.as_mut() {
            file.write_all(&chunk).await?;
        }
        upload.written += chunk.len() as u64;

        Ok(())
    }

    /// Flush the upload to disk, then register its metadata
    ///
    /// Nothing is registered unless every streamed byte made it to disk. On
    /// failure the partial file is removed.
    pub async fn finish_upload(
        &self,
        mut upload: PendingUpload,
        content_type: Option<&str>,
    ) -> Result<FileRecord> {
        let (storage_name, size) = match self.flush_target(&mut upload).await {
            Ok(stored) => stored,
            Err(e) => {
                self.abort_upload(upload).await;
                return Err(e);
            }
        };

        let mime_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .map(str::to_string);

        let record = self
            .store
            .register(&upload.original_name, &storage_name, size, mime_type)
            .await;

        Ok(record)
    }

    /// Drop an unfinished upload and remove whatever reached the disk
    pub async fn abort_upload(&self, mut upload: PendingUpload) {
        let Some((storage_name, file)) = upload.target.take() else {
            return;
        };
        drop(file);

        match self.storage.remove(&storage_name).await {
            Ok(()) => debug!("Removed partial upload {}", storage_name),
            Err(e) => warn!("Failed to remove partial upload {}: {}", storage_name, e),
        }
    }

    /// All records, newest upload first
    pub async fn list_files(&self) -> Vec<FileRecord> {
        let mut files = self.store.list_all().await;
        files.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| a.storage_name.cmp(&b.storage_name))
        });
        files
    }

    /// Resolve a storage name and open its bytes
    ///
    /// A record whose file has disappeared from disk is reported as not found.
    pub async fn open_download(&self, storage_name: &str) -> Result<FileDownload> {
        let record = self
            .store
            .find_by_storage_name(storage_name)
            .await
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        let (file, len) = match self.storage.open(&record.storage_name).await {
            Ok(opened) => opened,
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Metadata exists but file is missing on disk: id={}, filename={}",
                    record.id, record.storage_name
                );
                return Err(AppError::NotFound("File not found on disk".to_string()));
            }
            Err(e) => return Err(e),
        };

        debug!("Opened {} ({} bytes) for download", record.storage_name, len);

        Ok(FileDownload { record, file, len })
    }

    /// Remove a stored file and its metadata
    pub async fn delete_file(&self, storage_name: &str) -> Result<()> {
        self.store.delete(storage_name).await?;
        Ok(())
    }

    async fn ensure_target(&self, upload: &mut PendingUpload) -> Result<()> {
        if upload.target.is_none() {
            let created = self.create_with_fresh_name(&upload.extension).await?;
            upload.target = Some(created);
        }
        Ok(())
    }

    async fn flush_target(&self, upload: &mut PendingUpload) -> Result<(String, u64)> {
        // Empty uploads still get a file
        self.ensure_target(upload).await?;
        let Some((storage_name, file)) = upload.target.as_mut() else {
            return Err(AppError::Internal("Upload has no target file".to_string()));
        };

        file.flush().await?;
        file.sync_all().await?;

        let on_disk = file.metadata().await?.len();
        if on_disk != upload.written {
            return Err(AppError::Io(std::io::Error::other(format!(
                "Short write for {}: expected {} bytes, found {}",
                storage_name, upload.written, on_disk
            ))));
        }

        info!("File stored on disk: {} ({} bytes)", storage_name, on_disk);

        Ok((storage_name.clone(), on_disk))
    }

    async fn create_with_fresh_name(&self, extension: &str) -> Result<(String, fs::File)> {
        for _ in 0..MAX_STORAGE_NAME_ATTEMPTS {
            let storage_name = format!("{}{}", Uuid::new_v4(), extension);

            match self.storage.create_new(&storage_name).await {
                Ok(file) => return Ok((storage_name, file)),
                Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    warn!("Storage name collision on {}, drawing a new one", storage_name);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal(
            "Could not allocate a unique storage name".to_string(),
        ))
    }
}
