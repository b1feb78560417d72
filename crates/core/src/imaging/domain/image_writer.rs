use std::path::Path;

use crate::shared::frame::Frame;

/// Presentation-side sink for a finished frame.
pub trait ImageWriter: Send {
    /// Writes a frame to the given path at its own size.
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
