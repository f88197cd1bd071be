pub mod blank_frame_source;
#[cfg(feature = "camera")]
pub mod ffmpeg_capture_source;
pub mod image_sequence_source;
