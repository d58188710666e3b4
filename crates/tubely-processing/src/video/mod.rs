//! Video inspection: stream probing and orientation classification

pub mod orientation;
pub mod probe;

pub use orientation::classify_orientation;
pub use probe::{parse_probe_output, FfprobeProber, ProbeError, VideoProber};
