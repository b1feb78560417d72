pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_short_range.onnx";

/// Directory name used under the platform cache dir for downloaded models.
pub const APP_DIR_NAME: &str = "FaceStamp";

pub const DEFAULT_OVERLAY_PATH: &str = "emoji.png";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
