//! Tubely Core Library
//!
//! This crate provides the domain models, error types and configuration shared across
//! all Tubely crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{PlaybackUrlMode, StorageBackend};
// Note: Storage, StorageError, StorageResult live in the tubely-storage crate
