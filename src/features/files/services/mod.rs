mod file_service;
mod metadata_store;

pub use file_service::{FileDownload, FileService, PendingUpload};
pub use metadata_store::{MetadataStore, PersistError};
