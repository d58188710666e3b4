//! Tubely Storage Library
//!
//! This crate provides the object store gateway for Tubely: the Storage trait and its
//! implementations for S3 (and S3-compatible endpoints) and the local filesystem.
//!
//! # Storage key format
//!
//! Video keys are `{orientation}/{name}.{ext}` where `name` is 32 random bytes encoded as
//! unpadded base64url. Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StorageStream};
pub use tubely_core::StorageBackend;
