//! Tubely ingestion pipeline
//!
//! Stages an inbound upload on local disk, probes it with `ffprobe`, classifies its
//! orientation, writes it to the object store and attaches the storage reference to the
//! video record. The read side signs stored references into time-limited URLs.

pub mod ingest;
pub mod staging;
pub mod video;

pub use ingest::{IngestConfig, PlaybackSigner, VideoIngestService};
pub use staging::{normalize_media_type, StagedUpload, StagingError, StagingStore};
pub use video::{classify_orientation, FfprobeProber, ProbeError, VideoProber};
