use axum::{
    body::Body,
    extract::{multipart::Field, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::files::dtos::{
    FileListResponseDto, FileResponseDto, UploadFileDto, UploadFileResponseDto,
};
use crate::features::files::services::{FileService, PendingUpload};
use crate::shared::constants::{DEFAULT_CONTENT_TYPE, UPLOAD_FIELD_NAME};
use crate::shared::types::ApiResponse;
use crate::shared::validation::sanitize_header_filename;

/// Upload a file
///
/// Accepts multipart/form-data with a single `file` field.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "File upload form",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = UploadFileResponseDto),
        (status = 400, description = "No file uploaded or file too large", body = ApiResponse),
        (status = 500, description = "Failed to store the file", body = ApiResponse)
    )
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadFileResponseDto>), AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        // A part without a filename is a plain form value, not a file
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            debug!("Ignoring non-file field: {}", field_name);
            continue;
        };
        if field_name != UPLOAD_FIELD_NAME {
            debug!("Ignoring field: {}", field_name);
            continue;
        }

        let content_type = field.content_type().map(|s| s.to_string());

        let mut pending = service.begin_upload(&file_name);
        if let Err(e) = stream_field(&service, &mut pending, &mut field).await {
            service.abort_upload(pending).await;
            return Err(e);
        }

        let record = service
            .finish_upload(pending, content_type.as_deref())
            .await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadFileResponseDto {
                success: true,
                message: "File uploaded successfully".to_string(),
                file: record.into(),
            }),
        ));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// Copy a multipart field to disk chunk by chunk, enforcing the size limit as it goes
async fn stream_field(
    service: &FileService,
    pending: &mut PendingUpload,
    field: &mut Field<'_>,
) -> Result<(), AppError> {
    while let Some(chunk) = field.chunk().await.map_err(|e| {
        debug!("Failed to read file bytes: {}", e);
        AppError::BadRequest(format!("Failed to read file data: {}", e))
    })? {
        service.write_chunk(pending, chunk).await?;
    }
    Ok(())
}

/// List all stored files
#[utoipa::path(
    get,
    path = "/api/files/",
    tag = "files",
    responses(
        (status = 200, description = "All stored files, newest first", body = FileListResponseDto)
    )
)]
pub async fn list_files(State(service): State<Arc<FileService>>) -> Json<FileListResponseDto> {
    let files = service
        .list_files()
        .await
        .into_iter()
        .map(FileResponseDto::from)
        .collect();

    Json(FileListResponseDto {
        success: true,
        files,
    })
}

/// Download a file by its storage name
///
/// Streams the stored bytes as an attachment named after the original upload.
#[utoipa::path(
    get,
    path = "/api/files/{filename}/download",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Storage name of the file")
    ),
    responses(
        (status = 200, description = "File contents streamed as an attachment"),
        (status = 404, description = "File not found", body = ApiResponse)
    )
)]
pub async fn download_file(
    State(service): State<Arc<FileService>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let download = service.open_download(&filename).await?;

    let content_type = download
        .record
        .mime_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_header_filename(&download.record.original_name)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let body = Body::from_stream(ReaderStream::new(download.file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, download.len)
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}

/// Delete a file by its storage name
///
/// Removes the file from disk and drops its metadata.
#[utoipa::path(
    delete,
    path = "/api/files/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Storage name of the file")
    ),
    responses(
        (status = 200, description = "File deleted successfully", body = ApiResponse),
        (status = 404, description = "File not found", body = ApiResponse)
    )
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse>, AppError> {
    service.delete_file(&filename).await?;

    Ok(Json(ApiResponse::success("File deleted successfully")))
}
