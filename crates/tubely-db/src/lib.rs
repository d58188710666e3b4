//! Tubely record store
//!
//! Video records are read to authorize ownership and written to attach storage references.
//! Access goes through the [`VideoRepository`] trait; this crate ships an in-memory
//! implementation.

pub mod db;

pub use db::{InMemoryVideoRepository, RepositoryError, RepositoryResult, VideoRepository};
