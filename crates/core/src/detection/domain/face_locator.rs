use crate::detection::domain::detection_backend::DetectionBackend;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::StampError;
use crate::shared::frame::Frame;

/// Normalizes backend output into canonical `(top, right, bottom, left)` boxes.
///
/// Entries without a region are skipped with a warning. Backend errors are
/// reported as [`StampError::DetectionUnavailable`] so they can never be
/// mistaken for an image without faces.
pub struct FaceLocator {
    backend: Box<dyn DetectionBackend>,
}

impl FaceLocator {
    pub fn new(backend: Box<dyn DetectionBackend>) -> Self {
        Self { backend }
    }

    /// Runs the backend once and converts every well-formed result.
    pub fn detect_faces(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, StampError> {
        let records = self.backend.extract_faces(frame).map_err(|e| {
            StampError::DetectionUnavailable(format!("{} backend failed: {e}", self.backend.name()))
        })?;

        let mut boxes = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            match record.facial_area {
                Some(area) => boxes.push(BoundingBox::from_xywh(area.x, area.y, area.w, area.h)),
                None => log::warn!(
                    "Skipping malformed detection #{i} from {} (no facial area)",
                    self.backend.name()
                ),
            }
        }

        log::debug!(
            "{} returned {} results, {} usable",
            self.backend.name(),
            records.len(),
            boxes.len()
        );
        Ok(boxes)
    }
}

impl FaceDetector for FaceLocator {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, StampError> {
        self.detect_faces(frame)
    }
}
