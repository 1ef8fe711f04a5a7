//! In-memory index of stored files with a write-through JSON sidecar
//!
//! The index is keyed by record id. All mutations take the write lock for the
//! whole of the index change plus the snapshot write, so the sidecar always
//! reflects a state the index has actually been in. Sidecar write failures are
//! logged and otherwise ignored; the in-memory index stays authoritative until
//! the process restarts.

use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::FileRecord;
use crate::modules::storage::FileStorage;
use crate::shared::constants::METADATA_FILE_NAME;

type FileIndex = HashMap<Uuid, FileRecord>;

/// Failure to write the sidecar snapshot. Never surfaced to clients.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to serialize metadata index: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write metadata sidecar: {0}")]
    Io(#[from] std::io::Error),
}

pub struct MetadataStore {
    storage: Arc<dyn FileStorage>,
    sidecar_path: PathBuf,
    files: RwLock<FileIndex>,
}

impl MetadataStore {
    /// Open the store over `storage`, reloading the sidecar from its directory
    pub async fn open(storage: Arc<dyn FileStorage>) -> Self {
        let sidecar_path = storage.root().join(METADATA_FILE_NAME);
        let files = Self::reload(&sidecar_path).await;

        info!(
            "Metadata store loaded {} record(s) from {}",
            files.len(),
            sidecar_path.display()
        );

        Self {
            storage,
            sidecar_path,
            files: RwLock::new(files),
        }
    }

    /// Record a file that has already been written to disk
    pub async fn register(
        &self,
        original_name: &str,
        storage_name: &str,
        size: u64,
        mime_type: Option<String>,
    ) -> FileRecord {
        let mut files = self.files.write().await;

        let mut id = Uuid::new_v4();
        while files.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let record = FileRecord::new(id, original_name, storage_name, size, mime_type, Utc::now());
        files.insert(id, record.clone());
        self.persist(&files).await;

        info!(
            "File registered: id={}, filename={}, size={}",
            record.id, record.storage_name, record.size
        );

        record
    }

    /// Copy of every record, in no particular order
    pub async fn list_all(&self) -> Vec<FileRecord> {
        self.files.read().await.values().cloned().collect()
    }

    /// Linear scan for the record with the given storage name
    pub async fn find_by_storage_name(&self, storage_name: &str) -> Option<FileRecord> {
        self.files
            .read()
            .await
            .values()
            .find(|record| record.storage_name == storage_name)
            .cloned()
    }

    /// Remove the file from disk, then drop its record
    ///
    /// If the disk removal fails the record is kept and the IO error returned.
    pub async fn delete(&self, storage_name: &str) -> Result<FileRecord> {
        let mut files = self.files.write().await;

        let key = files
            .iter()
            .find(|(_, record)| record.storage_name == storage_name)
            .map(|(key, _)| *key)
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        self.storage.remove(storage_name).await?;

        let record = files
            .remove(&key)
            .ok_or_else(|| AppError::Internal(format!("Record {} vanished under lock", key)))?;
        self.persist(&files).await;

        info!("File deleted: id={}, filename={}", record.id, record.storage_name);

        Ok(record)
    }

    /// Write the current index to the sidecar
    ///
    /// Takes the write lock so it never races a mutation on the temp file.
    pub async fn snapshot(&self) -> std::result::Result<(), PersistError> {
        let files = self.files.write().await;
        write_snapshot(&self.sidecar_path, &files).await
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }

    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar_path
    }

    async fn persist(&self, files: &FileIndex) {
        if let Err(e) = write_snapshot(&self.sidecar_path, files).await {
            warn!(
                "Metadata sidecar not persisted, keeping in-memory index: {}",
                e
            );
        }
    }

    async fn reload(sidecar_path: &Path) -> FileIndex {
        let data = match fs::read(sidecar_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No metadata sidecar at {}", sidecar_path.display());
                return FileIndex::new();
            }
            Err(e) => {
                warn!(
                    "Failed to read metadata sidecar {}, starting empty: {}",
                    sidecar_path.display(),
                    e
                );
                return FileIndex::new();
            }
        };

        match serde_json::from_slice::<HashMap<String, FileRecord>>(&data) {
            Ok(entries) => rekey_by_id(entries),
            Err(e) => {
                warn!(
                    "Corrupt metadata sidecar {}, starting empty: {}",
                    sidecar_path.display(),
                    e
                );
                FileIndex::new()
            }
        }
    }
}

// The sidecar's object keys are not trusted; every record is indexed under its
// own id, and a record whose id is already taken gets a fresh one.
fn rekey_by_id(entries: HashMap<String, FileRecord>) -> FileIndex {
    let mut files = FileIndex::with_capacity(entries.len());

    for (key, mut record) in entries {
        if key != record.id.to_string() {
            warn!(
                "Sidecar key {} does not match record id {}, indexing under the id",
                key, record.id
            );
        }
        if files.contains_key(&record.id) {
            let mut id = Uuid::new_v4();
            while files.contains_key(&id) {
                id = Uuid::new_v4();
            }
            warn!(
                "Duplicate record id {} for {}, reassigned to {}",
                record.id, record.storage_name, id
            );
            record.id = id;
        }
        files.insert(record.id, record);
    }

    files
}

// Written to a sibling temp file first so a crash never truncates the sidecar
async fn write_snapshot(sidecar_path: &Path, files: &FileIndex) -> std::result::Result<(), PersistError> {
    let data = serde_json::to_vec_pretty(files)?;

    let tmp_path = sidecar_path.with_extension("json.tmp");
    fs::write(&tmp_path, &data).await?;
    fs::rename(&tmp_path, sidecar_path).await?;

    Ok(())
}
