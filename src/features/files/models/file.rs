use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::shared::constants::FILES_API_PREFIX;

/// Metadata for one stored file, as kept in the index and the sidecar
///
/// Records are immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    /// Client-supplied filename, untrusted
    pub original_name: String,
    /// Server-generated on-disk name, also the public lookup key
    #[serde(rename = "filename")]
    pub storage_name: String,
    pub size: u64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub mime_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub download_url: String,
}

impl FileRecord {
    pub fn new(
        id: Uuid,
        original_name: impl Into<String>,
        storage_name: impl Into<String>,
        size: u64,
        mime_type: Option<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        let storage_name = storage_name.into();
        let download_url = download_url_for(&storage_name);

        Self {
            id,
            original_name: original_name.into(),
            storage_name,
            size,
            mime_type,
            uploaded_at,
            download_url,
        }
    }
}

/// Public download path for a storage name
pub fn download_url_for(storage_name: &str) -> String {
    format!("{}/{}/download", FILES_API_PREFIX, storage_name)
}

// Older sidecars store a missing MIME type as ""
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_download_url_is_derived_from_storage_name() {
        let record = FileRecord::new(
            Uuid::new_v4(),
            "report.pdf",
            "0b9c.pdf",
            500,
            Some("application/pdf".to_string()),
            Utc::now(),
        );
        assert_eq!(record.download_url, "/api/files/0b9c.pdf/download");
    }

    #[test]
    fn test_serialized_field_names() {
        let record = FileRecord::new(
            Uuid::nil(),
            "report.pdf",
            "abc.pdf",
            500,
            None,
            DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "originalName": "report.pdf",
                "filename": "abc.pdf",
                "size": 500,
                "mimeType": null,
                "uploadedAt": "2024-05-01T10:00:00Z",
                "downloadUrl": "/api/files/abc.pdf/download"
            })
        );
    }

    #[test]
    fn test_deserialize_empty_mime_type_and_offset_timestamp() {
        let value = json!({
            "id": "6f1c2b52-3f5e-4e0b-9d1a-0a4f3f0f9e11",
            "originalName": "notes.txt",
            "filename": "6f1c2b52.txt",
            "size": 12,
            "mimeType": "",
            "uploadedAt": "2024-05-01T17:00:00.123456789+07:00",
            "downloadUrl": "/api/files/6f1c2b52.txt/download"
        });

        let record: FileRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.mime_type, None);
        assert_eq!(
            record.uploaded_at,
            DateTime::parse_from_rfc3339("2024-05-01T10:00:00.123456789Z").unwrap()
        );
    }
}
