use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::detection::domain::detection_backend::DetectionBackend;
use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::constants::{BLAZEFACE_MODEL_NAME, YOLO_MODEL_NAME, YOLO_MODEL_URL};
use crate::shared::error::StampError;

use super::model_resolver::{self, ProgressFn};
use super::onnx_blazeface_backend::{self, OnnxBlazefaceBackend};
use super::onnx_yolo_backend::{self, OnnxYoloBackend};

/// Detector algorithm used by the Face Locator.
///
/// `Yolo` trades latency for recall; `Blazeface` is the fast option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorKind {
    #[default]
    Yolo,
    Blazeface,
}

impl DetectorKind {
    pub fn default_confidence(self) -> f64 {
        match self {
            DetectorKind::Yolo => onnx_yolo_backend::DEFAULT_CONFIDENCE,
            DetectorKind::Blazeface => onnx_blazeface_backend::DEFAULT_CONFIDENCE,
        }
    }

    pub fn model_name(self) -> &'static str {
        match self {
            DetectorKind::Yolo => YOLO_MODEL_NAME,
            DetectorKind::Blazeface => BLAZEFACE_MODEL_NAME,
        }
    }

    /// Download location, if the model is published.
    pub fn model_url(self) -> Option<&'static str> {
        match self {
            DetectorKind::Yolo => Some(YOLO_MODEL_URL),
            DetectorKind::Blazeface => None,
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorKind::Yolo => f.write_str("yolo"),
            DetectorKind::Blazeface => f.write_str("blazeface"),
        }
    }
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yolo" => Ok(DetectorKind::Yolo),
            "blazeface" => Ok(DetectorKind::Blazeface),
            other => Err(format!(
                "Detector must be 'yolo' or 'blazeface', got '{other}'"
            )),
        }
    }
}

/// Locates the model file for `kind`: an explicit path wins, otherwise the
/// cached copy or a fresh download is used.
pub fn resolve_model(
    kind: DetectorKind,
    explicit: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, StampError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(StampError::DetectionUnavailable(format!(
                "model file not found: {}",
                path.display()
            )));
        }
        return Ok(path.to_path_buf());
    }

    log::info!("Resolving model: {}", kind.model_name());
    model_resolver::resolve(kind.model_name(), kind.model_url(), progress)
        .map_err(|e| StampError::DetectionUnavailable(e.to_string()))
}

/// Loads the ONNX session for `kind`.
pub fn create_backend(
    kind: DetectorKind,
    model_path: &Path,
    confidence: f64,
) -> Result<Box<dyn DetectionBackend>, StampError> {
    log::info!(
        "Loading {kind} detector from {} (confidence={confidence})",
        model_path.display()
    );
    let unavailable =
        |e: Box<dyn std::error::Error>| StampError::DetectionUnavailable(format!("{kind}: {e}"));

    let backend: Box<dyn DetectionBackend> = match kind {
        DetectorKind::Yolo => {
            Box::new(OnnxYoloBackend::new(model_path, confidence).map_err(unavailable)?)
        }
        DetectorKind::Blazeface => {
            Box::new(OnnxBlazefaceBackend::new(model_path, confidence).map_err(unavailable)?)
        }
    };
    Ok(backend)
}

/// Resolves the model and wraps the backend in a [`FaceLocator`].
pub fn create_locator(
    kind: DetectorKind,
    explicit_model: Option<&Path>,
    confidence: Option<f64>,
    progress: Option<ProgressFn>,
) -> Result<FaceLocator, StampError> {
    let model_path = resolve_model(kind, explicit_model, progress)?;
    let confidence = confidence.unwrap_or_else(|| kind.default_confidence());
    Ok(FaceLocator::new(create_backend(kind, &model_path, confidence)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("yolo", DetectorKind::Yolo)]
    #[case("YOLO", DetectorKind::Yolo)]
    #[case("blazeface", DetectorKind::Blazeface)]
    fn test_parse_detector_kind(#[case] input: &str, #[case] expected: DetectorKind) {
        assert_eq!(input.parse::<DetectorKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_detector_fails() {
        let err = "haar".parse::<DetectorKind>().unwrap_err();
        assert!(err.contains("haar"));
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for kind in [DetectorKind::Yolo, DetectorKind::Blazeface] {
            assert_eq!(kind.to_string().parse::<DetectorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_default_is_accurate_detector() {
        assert_eq!(DetectorKind::default(), DetectorKind::Yolo);
    }

    #[test]
    fn test_only_yolo_has_download_url() {
        assert!(DetectorKind::Yolo.model_url().is_some());
        assert!(DetectorKind::Blazeface.model_url().is_none());
    }

    #[test]
    fn test_missing_explicit_model_is_detection_unavailable() {
        let err = resolve_model(
            DetectorKind::Yolo,
            Some(Path::new("/nonexistent/model.onnx")),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, StampError::DetectionUnavailable(_)));
    }

    #[test]
    fn test_explicit_model_path_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.onnx");
        std::fs::write(&path, b"onnx").unwrap();
        let resolved = resolve_model(DetectorKind::Blazeface, Some(&path), None).unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    fn test_corrupt_model_is_detection_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.onnx");
        std::fs::write(&path, b"definitely not onnx").unwrap();
        let result = create_backend(DetectorKind::Blazeface, &path, 0.5);
        assert!(matches!(result, Err(StampError::DetectionUnavailable(_))));
    }
}
