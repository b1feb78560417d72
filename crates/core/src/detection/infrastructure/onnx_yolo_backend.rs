/// YOLO face detection backend using ONNX Runtime via `ort`.
///
/// The high-recall choice: slower than BlazeFace but far better on small,
/// rotated, and partially occluded faces.
use std::path::Path;

use crate::detection::domain::detection_backend::{DetectionBackend, FaceRecord};
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;
use super::math::{nms, ScoredBox};

/// Fallback YOLO model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for face detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

/// YOLO face detection backed by an ONNX Runtime session.
pub struct OnnxYoloBackend {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloBackend {
    /// Load a YOLO ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting NCHW).
    /// Falls back to 640 if the shape is dynamic or unreadable.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    // [N, C, H, W]; square input, so H is enough
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::debug!("YOLO model input size: {input_size}");
        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl DetectionBackend for OnnxYoloBackend {
    fn name(&self) -> &'static str {
        "yolo"
    }

    fn extract_faces(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceRecord>, Box<dyn std::error::Error>> {
        let letterboxed = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(letterboxed.tensor.clone())?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        let mut dets = decode_output(data, &shape, self.confidence, &letterboxed)?;
        let kept = nms(&mut dets, NMS_IOU_THRESH);

        Ok(kept
            .iter()
            .map(|d| d.to_face_record(frame.width(), frame.height()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

struct Letterbox {
    tensor: ndarray::Array4<f32>,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

/// Letterbox-resize a frame to `target_size` × `target_size` as an NCHW
/// float32 tensor normalized to [0, 1].
fn letterbox(frame: &Frame, target_size: u32) -> Letterbox {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).clamp(1, target_size);
    let new_h = ((fh * scale).round() as u32).clamp(1, target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = frame.as_ndarray(); // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize into the padded region
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    Letterbox {
        tensor,
        scale,
        pad_x,
        pad_y,
    }
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

/// Parses raw YOLO output rows `[cx, cy, w, h, conf, ...]` into source-image
/// boxes above the confidence threshold.
///
/// Accepts both `[1, features, detections]` and `[1, detections, features]`.
fn decode_output(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
    lb: &Letterbox,
) -> Result<Vec<ScoredBox>, Box<dyn std::error::Error>> {
    if shape.len() != 3 {
        return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if data.len() < num_dets * num_feats {
        return Err(format!(
            "YOLO output has {} values, shape {shape:?} needs {}",
            data.len(),
            num_dets * num_feats
        )
        .into());
    }
    if num_feats < 5 {
        return Ok(Vec::new());
    }

    let value = |det: usize, feat: usize| -> f64 {
        if transposed {
            data[feat * num_dets + det] as f64
        } else {
            data[det * num_feats + feat] as f64
        }
    };

    let mut dets = Vec::new();
    for i in 0..num_dets {
        let conf = value(i, 4);
        // NaN compares false against the threshold
        if conf.is_nan() || conf < confidence {
            continue;
        }
        let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));

        // Undo letterbox: remove padding, then scale
        dets.push(ScoredBox {
            x1: ((cx - w / 2.0) - lb.pad_x as f64) / lb.scale,
            y1: ((cy - h / 2.0) - lb.pad_y as f64) / lb.scale,
            x2: ((cx + w / 2.0) - lb.pad_x as f64) / lb.scale,
            y2: ((cy + h / 2.0) - lb.pad_y as f64) / lb.scale,
            score: conf,
        });
    }
    Ok(dets)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 → 640: scale 3.2, new 640x320, pad_y 160
        let frame = Frame::filled(200, 100, [128, 128, 128]);
        let lb = letterbox(&frame, 640);

        assert_eq!(lb.tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(lb.scale, 3.2, epsilon = 0.01);
        assert_eq!(lb.pad_x, 0);
        assert_eq!(lb.pad_y, 160);
    }

    #[test]
    fn test_letterbox_square_frame() {
        let frame = Frame::filled(100, 100, [128, 128, 128]);
        let lb = letterbox(&frame, 640);
        assert_relative_eq!(lb.scale, 6.4, epsilon = 0.01);
        assert_eq!((lb.pad_x, lb.pad_y), (0, 0));
    }

    #[test]
    fn test_letterbox_values_normalized() {
        let frame = Frame::filled(100, 50, [255, 255, 255]);
        let lb = letterbox(&frame, 640);
        assert!(lb.pad_y > 0);

        let y = lb.pad_y as usize + 1;
        let x = lb.pad_x as usize + 1;
        assert_relative_eq!(lb.tensor[[0, 0, y, x]], 1.0, epsilon = 0.01);
        assert_relative_eq!(lb.tensor[[0, 0, 0, 0]], PAD_VALUE, epsilon = 0.01);
    }

    #[test]
    fn test_letterbox_single_pixel_frame() {
        let frame = Frame::filled(1, 1, [0, 0, 0]);
        let lb = letterbox(&frame, 64);
        assert_eq!(lb.tensor.shape(), &[1, 3, 64, 64]);
        assert_relative_eq!(lb.tensor[[0, 0, 10, 10]], 0.0);
    }

    fn identity_letterbox() -> Letterbox {
        Letterbox {
            tensor: ndarray::Array4::zeros((1, 3, 1, 1)),
            scale: 1.0,
            pad_x: 0,
            pad_y: 0,
        }
    }

    /// Row-major `[1, 5, 5]` buffer; detections after `rows` have zero confidence.
    fn row_major(rows: &[[f32; 5]]) -> Vec<f32> {
        let mut data = vec![0.0f32; 5 * 5];
        for (i, row) in rows.iter().enumerate() {
            data[i * 5..(i + 1) * 5].copy_from_slice(row);
        }
        data
    }

    #[test]
    fn test_decode_row_major_output() {
        // Rows of [cx, cy, w, h, conf]
        let data = row_major(&[
            [50.0, 50.0, 20.0, 40.0, 0.9],
            [10.0, 10.0, 4.0, 4.0, 0.1],
        ]);
        let dets = decode_output(&data, &[1, 5, 5], 0.25, &identity_letterbox()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 40.0);
        assert_relative_eq!(dets[0].y1, 30.0);
        assert_relative_eq!(dets[0].x2, 60.0);
        assert_relative_eq!(dets[0].y2, 70.0);
        assert_relative_eq!(dets[0].score, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_transposed_output() {
        // Same detection stored feature-major: shape [1, 5, 6]
        let mut data = vec![0.0f32; 5 * 6];
        let feats = [50.0, 50.0, 20.0, 40.0, 0.9];
        for (f, v) in feats.iter().enumerate() {
            data[f * 6 + 3] = *v;
        }
        let dets = decode_output(&data, &[1, 5, 6], 0.25, &identity_letterbox()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 40.0);
        assert_relative_eq!(dets[0].y2, 70.0);
    }

    #[test]
    fn test_decode_undoes_letterbox() {
        let lb = Letterbox {
            tensor: ndarray::Array4::zeros((1, 3, 1, 1)),
            scale: 2.0,
            pad_x: 0,
            pad_y: 100,
        };
        let data = row_major(&[[100.0, 200.0, 40.0, 40.0, 0.8]]);
        let dets = decode_output(&data, &[1, 5, 5], 0.25, &lb).unwrap();
        assert_eq!(dets.len(), 1);
        // x1 = (80 - 0) / 2, y1 = (180 - 100) / 2
        assert_relative_eq!(dets[0].x1, 40.0);
        assert_relative_eq!(dets[0].y1, 40.0);
        assert_relative_eq!(dets[0].x2, 60.0);
        assert_relative_eq!(dets[0].y2, 60.0);
    }

    #[test]
    fn test_decode_rejects_unexpected_rank() {
        assert!(decode_output(&[0.0; 5], &[5], 0.25, &identity_letterbox()).is_err());
    }

    #[test]
    fn test_decode_rejects_short_buffer() {
        assert!(decode_output(&[0.0; 20], &[1, 5, 5], 0.25, &identity_letterbox()).is_err());
    }

    #[test]
    fn test_decode_drops_nan_confidence() {
        let data = row_major(&[
            [50.0, 50.0, 20.0, 40.0, f32::NAN],
            [30.0, 30.0, 10.0, 10.0, 0.7],
        ]);
        let dets = decode_output(&data, &[1, 5, 5], 0.25, &identity_letterbox()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].score, 0.7, epsilon = 1e-6);
    }
}
