pub mod embedding_gallery;
#[cfg(feature = "recognition")]
pub mod onnx_face_recognizer;
pub mod replay_detection_adapter;
pub mod yolo_decoding;
