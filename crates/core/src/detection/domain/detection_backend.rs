use crate::shared::frame::Frame;

/// Face region reported by a backend: top-left corner and size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacialArea {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// One backend result. `facial_area` is `None` when the backend produced an
/// entry it could not describe as a region.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceRecord {
    pub facial_area: Option<FacialArea>,
    pub confidence: f64,
}

impl FaceRecord {
    pub fn new(area: FacialArea, confidence: f64) -> Self {
        Self {
            facial_area: Some(area),
            confidence,
        }
    }
}

/// External face detection model, treated as a black box.
pub trait DetectionBackend: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn extract_faces(&mut self, frame: &Frame)
        -> Result<Vec<FaceRecord>, Box<dyn std::error::Error>>;
}
