//! Repositories for data access
//
// Video records
pub mod video;

pub use video::{InMemoryVideoRepository, RepositoryError, RepositoryResult, VideoRepository};
