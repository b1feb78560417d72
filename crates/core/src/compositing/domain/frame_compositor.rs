use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::StampError;
use crate::shared::frame::Frame;

/// Domain interface for stamping an overlay onto face boxes.
///
/// Implementations return a new frame and leave the input untouched. Every
/// box must already lie inside the frame; an invalid box fails the whole
/// call before any pixel is written.
pub trait FrameCompositor: Send + Sync {
    fn composite(&self, frame: &Frame, boxes: &[BoundingBox]) -> Result<Frame, StampError>;
}
