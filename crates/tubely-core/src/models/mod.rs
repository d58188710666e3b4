//! Data models for the application

mod video;

// Re-export all models for convenient imports
pub use video::*;
