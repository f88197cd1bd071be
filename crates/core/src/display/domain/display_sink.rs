use crate::shared::frame::Frame;

use super::annotation::Annotation;

/// Receives each processed frame together with its annotations.
///
/// Rendering is cosmetic: the session logs and ignores `show` failures.
pub trait DisplaySink: Send {
    fn show(
        &mut self,
        frame: &Frame,
        annotations: &[Annotation],
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Releases any window, file handle or device. Must be idempotent.
    fn close(&mut self) {}
}

/// Discards everything. Used for headless runs and in tests.
pub struct NullDisplaySink;

impl DisplaySink for NullDisplaySink {
    fn show(
        &mut self,
        _frame: &Frame,
        _annotations: &[Annotation],
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Logs annotation captions at debug level.
pub struct LogDisplaySink;

impl DisplaySink for LogDisplaySink {
    fn show(
        &mut self,
        frame: &Frame,
        annotations: &[Annotation],
    ) -> Result<(), Box<dyn std::error::Error>> {
        for a in annotations {
            log::debug!(
                "frame {}: {} at ({}, {}, {}x{})",
                frame.index(),
                a.caption,
                a.region.x,
                a.region.y,
                a.region.width,
                a.region.height
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::region::Region;

    #[test]
    fn test_null_and_log_sinks_accept_frames() {
        let frame = Frame::blank(8, 8, 0);
        let annotations = vec![Annotation::unknown(Region::new(1, 1, 4, 4))];

        let mut null = NullDisplaySink;
        null.show(&frame, &annotations).unwrap();
        null.close();
        null.close();

        let mut logger = LogDisplaySink;
        logger.show(&frame, &annotations).unwrap();
        logger.close();
    }
}
