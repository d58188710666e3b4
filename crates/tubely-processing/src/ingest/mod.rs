//! Ingestion orchestrator and the read-side signing path

pub mod service;
pub mod signing;
#[cfg(test)]
pub(crate) mod testing;

pub use service::{IngestConfig, VideoIngestService};
pub use signing::PlaybackSigner;
