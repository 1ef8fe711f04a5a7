/// Default upper bound for a single upload (100 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Extra request body allowance on top of the file size for multipart framing
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Name of the JSON sidecar holding the metadata index, stored inside the upload directory
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Fallback original name when the client sends none
pub const UNNAMED_FILE: &str = "unnamed";

/// Content type used for downloads without a recorded MIME type
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Public prefix of every file route
pub const FILES_API_PREFIX: &str = "/api/files";

/// Attempts at drawing a fresh storage name before giving up
pub const MAX_STORAGE_NAME_ATTEMPTS: usize = 3;
