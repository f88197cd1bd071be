use crate::capture::domain::frame_source::{FrameAcquisitionError, FrameSource};
use crate::shared::frame::Frame;

/// Endless black frames of a fixed size.
///
/// Pairs with detection adapters that do not look at pixels, such as the
/// replay adapter.
pub struct BlankFrameSource {
    width: u32,
    height: u32,
    next_index: usize,
    closed: bool,
}

impl BlankFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_index: 0,
            closed: false,
        }
    }
}

impl FrameSource for BlankFrameSource {
    fn read(&mut self) -> Result<Frame, FrameAcquisitionError> {
        if self.closed {
            return Err(FrameAcquisitionError::Closed);
        }
        let frame = Frame::blank(self.width, self.height, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_have_requested_size_and_increasing_index() {
        let mut source = BlankFrameSource::new(64, 48);
        let a = source.read().unwrap();
        let b = source.read().unwrap();
        assert_eq!((a.width(), a.height()), (64, 48));
        assert_eq!((a.index(), b.index()), (0, 1));
    }

    #[test]
    fn test_read_after_close_fails() {
        let mut source = BlankFrameSource::new(4, 4);
        source.close();
        source.close();
        assert!(matches!(source.read(), Err(FrameAcquisitionError::Closed)));
    }
}
