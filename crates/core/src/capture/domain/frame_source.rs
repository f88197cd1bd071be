use thiserror::Error;

use crate::shared::frame::Frame;

/// A single failed read. The session logs it and tries the next frame.
#[derive(Error, Debug)]
pub enum FrameAcquisitionError {
    #[error("frame source is closed")]
    Closed,
    #[error("end of stream")]
    EndOfStream,
    #[error("failed to decode frame: {0}")]
    Decode(String),
    #[error("capture device error: {0}")]
    Device(String),
}

/// Produces frames on demand, blocking until one is available.
///
/// Frame indices increase by one per successful read.
pub trait FrameSource: Send {
    fn read(&mut self) -> Result<Frame, FrameAcquisitionError>;

    /// Releases the underlying device or file. Must be idempotent.
    fn close(&mut self) {}
}
