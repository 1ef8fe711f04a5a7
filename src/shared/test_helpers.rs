use axum_test::TestServer;
use std::sync::Arc;
use tempfile::TempDir;

use crate::features::files::{routes as files_routes, FileService, MetadataStore};
use crate::modules::storage::{FileStorage, LocalDiskStorage};

/// File service over a fresh temporary upload directory
pub async fn file_service_in_tempdir(max_file_size: u64) -> (Arc<FileService>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn FileStorage> = Arc::new(LocalDiskStorage::new(dir.path()).await.unwrap());
    let store = Arc::new(MetadataStore::open(Arc::clone(&storage)).await);
    let service = Arc::new(FileService::new(store, storage, max_file_size));
    (service, dir)
}

/// Test server exposing the file routes. Keep the `TempDir` alive for the test's duration.
pub async fn file_test_server(max_file_size: u64) -> (TestServer, TempDir) {
    let (service, dir) = file_service_in_tempdir(max_file_size).await;
    let server = TestServer::new(files_routes::routes(service)).unwrap();
    (server, dir)
}

/// Deterministic payload starting with a PDF header
pub fn pdf_bytes(len: usize) -> Vec<u8> {
    b"%PDF-1.4\n"
        .iter()
        .copied()
        .chain((0u8..=255).cycle())
        .take(len)
        .collect()
}
