use tubely_core::models::{Orientation, StreamGeometry};

/// Classify a stream by the integer ratio `width / height`.
///
/// A ratio of 1 is landscape, 0 is portrait, anything else is other. Integer division
/// means square video lands in landscape and anything 2:1 or wider lands in other.
pub fn classify_orientation(geometry: StreamGeometry) -> Orientation {
    if geometry.height == 0 {
        return Orientation::Other;
    }

    match geometry.width / geometry.height {
        1 => Orientation::Landscape,
        0 => Orientation::Portrait,
        _ => Orientation::Other,
    }
}
