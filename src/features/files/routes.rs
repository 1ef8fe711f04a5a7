use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{delete_file, download_file, list_files, upload_file};
use crate::features::files::services::FileService;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>) -> Router {
    let upload_body_limit = file_service.upload_body_limit();

    Router::new()
        .route(
            "/api/files/upload",
            post(upload_file).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/api/files", get(list_files))
        .route("/api/files/", get(list_files))
        .route("/api/files/{filename}/download", get(download_file))
        .route("/api/files/{filename}", delete(delete_file))
        .with_state(file_service)
}
