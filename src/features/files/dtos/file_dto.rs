use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::files::models::FileRecord;

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Metadata of a stored file as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponseDto {
    /// Unique identifier for the file
    pub id: Uuid,
    /// Original filename as uploaded
    #[schema(example = "report.pdf")]
    pub original_name: String,
    /// Server-generated storage name, used in download and delete URLs
    #[serde(rename = "filename")]
    #[schema(example = "5f0c1d7e-8a55-4a3b-9a57-2b1f6f0e9c41.pdf")]
    pub storage_name: String,
    /// Size of the file in bytes
    pub size: u64,
    /// MIME type declared by the uploader
    #[schema(example = "application/pdf")]
    pub mime_type: Option<String>,
    /// Timestamp when the file was uploaded
    pub uploaded_at: DateTime<Utc>,
    /// Relative URL to download the file
    #[schema(example = "/api/files/5f0c1d7e-8a55-4a3b-9a57-2b1f6f0e9c41.pdf/download")]
    pub download_url: String,
}

impl From<FileRecord> for FileResponseDto {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            original_name: record.original_name,
            storage_name: record.storage_name,
            size: record.size,
            mime_type: record.mime_type,
            uploaded_at: record.uploaded_at,
            download_url: record.download_url,
        }
    }
}

/// Response DTO for a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadFileResponseDto {
    pub success: bool,
    #[schema(example = "File uploaded successfully")]
    pub message: String,
    pub file: FileResponseDto,
}

/// Response DTO for the file listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileListResponseDto {
    pub success: bool,
    pub files: Vec<FileResponseDto>,
}
