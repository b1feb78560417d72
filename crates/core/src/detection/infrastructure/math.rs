//! Box geometry shared by the ONNX detection backends.
//!
//! Both backends decode raw corner boxes in source-image coordinates, run
//! greedy NMS, then clamp the survivors into [`FaceRecord`]s.

use crate::detection::domain::detection_backend::{FaceRecord, FacialArea};

/// Decoded detection in source-image pixel coordinates `[x1, y1, x2, y2]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub score: f64,
}

impl ScoredBox {
    fn corners(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Clamps the box to the frame and converts it to a backend record.
    ///
    /// Boxes that collapse to nothing after clamping still produce a record;
    /// the pipeline rejects degenerate boxes downstream.
    pub fn to_face_record(&self, frame_width: u32, frame_height: u32) -> FaceRecord {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let x1 = self.x1.clamp(0.0, fw).floor() as i32;
        let y1 = self.y1.clamp(0.0, fh).floor() as i32;
        let x2 = self.x2.clamp(0.0, fw).ceil() as i32;
        let y2 = self.y2.clamp(0.0, fh).ceil() as i32;
        FaceRecord::new(
            FacialArea {
                x: x1,
                y: y1,
                w: x2 - x1,
                h: y2 - y1,
            },
            self.score,
        )
    }
}

/// IoU between two bounding boxes represented as `[x1, y1, x2, y2]`.
pub fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// Greedy NMS: sort by score descending, suppress overlapping boxes.
pub fn nms(dets: &mut [ScoredBox], iou_thresh: f64) -> Vec<ScoredBox> {
    dets.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && bbox_iou(&dets[i].corners(), &dets[j].corners()) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}
