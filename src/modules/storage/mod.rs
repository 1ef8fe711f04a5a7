//! Storage module for uploaded file bytes
//!
//! Provides the `FileStorage` abstraction and its local filesystem
//! implementation. Metadata about the stored files lives elsewhere.

mod local_disk;

pub use local_disk::{FileStorage, LocalDiskStorage};
