//! Modules layer - Infrastructure components
//!
//! Contains adapters for resources outside the process, such as disk storage.

pub mod storage;
