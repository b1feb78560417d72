use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::StampError;
use crate::shared::frame::Frame;

/// Domain interface for locating faces in a normalized frame.
///
/// Implementations wrap inference sessions that need exclusive access,
/// hence `&mut self`. An empty result means no faces were found; a backend
/// that cannot run must return [`StampError::DetectionUnavailable`] instead.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, StampError>;
}
