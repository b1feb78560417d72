/// BlazeFace face detection backend using ONNX Runtime via `ort`.
///
/// A lightweight detector: fast, but misses small and profile faces more
/// often than YOLO.
use std::path::Path;

use crate::detection::domain::detection_backend::{DetectionBackend, FaceRecord};
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;
use super::math::{nms, ScoredBox};

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// Default confidence threshold.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output (4 box + 12 keypoint values).
const REGRESSOR_STRIDE: usize = 16;

pub struct OnnxBlazefaceBackend {
    session: ort::session::Session,
    confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceBackend {
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        Ok(Self {
            session,
            confidence,
            anchors: generate_anchors(),
        })
    }
}

impl DetectionBackend for OnnxBlazefaceBackend {
    fn name(&self) -> &'static str {
        "blazeface"
    }

    fn extract_faces(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceRecord>, Box<dyn std::error::Error>> {
        let input_tensor = preprocess(frame, INPUT_SIZE);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // regressors: [1, 896, 16], classificators: [1, 896, 1]
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }

        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        let mut dets = decode_anchors(
            &self.anchors,
            reg_data,
            score_data,
            self.confidence,
            frame.width(),
            frame.height(),
        );
        let kept = nms(&mut dets, NMS_IOU_THRESH);

        Ok(kept
            .iter()
            .map(|d| d.to_face_record(frame.width(), frame.height()))
            .collect())
    }
}

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Generate BlazeFace anchors for the short-range model.
///
/// Two feature maps: 16×16 with 2 anchors per cell and 8×8 with 6.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

/// Decodes anchor-relative regressions into frame-space boxes above threshold.
fn decode_anchors(
    anchors: &[[f32; 2]],
    reg_data: &[f32],
    score_data: &[f32],
    confidence: f64,
    frame_width: u32,
    frame_height: u32,
) -> Vec<ScoredBox> {
    let fw = frame_width as f64;
    let fh = frame_height as f64;
    let size = INPUT_SIZE as f32;
    let mut dets = Vec::new();

    for (i, &raw_score) in score_data.iter().enumerate().take(anchors.len()) {
        let score = sigmoid(raw_score) as f64;
        if score.is_nan() || score < confidence {
            continue;
        }
        let offset = i * REGRESSOR_STRIDE;
        if offset + 4 > reg_data.len() {
            break;
        }

        let anchor = anchors[i];
        let cx = (anchor[0] + reg_data[offset] / size) as f64;
        let cy = (anchor[1] + reg_data[offset + 1] / size) as f64;
        let w = (reg_data[offset + 2] / size) as f64;
        let h = (reg_data[offset + 3] / size) as f64;

        dets.push(ScoredBox {
            x1: (cx - w / 2.0) * fw,
            y1: (cy - h / 2.0) * fh,
            x2: (cx + w / 2.0) * fw,
            y2: (cy + h / 2.0) * fh,
            score,
        });
    }
    dets
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
