pub mod backend_factory;
pub mod execution_provider;
mod math;
pub mod model_resolver;
pub mod onnx_blazeface_backend;
pub mod onnx_yolo_backend;
