use thiserror::Error;

use crate::shared::bounding_box::BoundingBox;

/// Failure reasons surfaced by the stamping pipeline.
///
/// Request-wide failures (`ImageDecode`, `DetectionUnavailable`) abort the
/// request. `InvalidBoundingBox` concerns a single face and is recovered by
/// the pipeline. `OverlayAsset` is raised when the overlay is loaded.
#[derive(Error, Debug)]
pub enum StampError {
    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    #[error("face detection unavailable: {0}")]
    DetectionUnavailable(String),

    #[error("invalid bounding box {bbox} for {image_width}x{image_height} image: {reason}")]
    InvalidBoundingBox {
        bbox: BoundingBox,
        image_width: u32,
        image_height: u32,
        reason: &'static str,
    },

    #[error("overlay asset error: {0}")]
    OverlayAsset(String),
}
