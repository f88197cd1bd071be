use crate::capture::domain::frame_source::FrameSource;
use crate::detection::domain::detection_adapter::DetectionAdapter;
use crate::display::domain::display_sink::DisplaySink;

use super::session_context::SessionContext;

/// The devices a session holds while observing.
///
/// Dropping `Devices` closes the frame source and the display, so every
/// exit from the observation loop releases them.
pub struct Devices {
    pub frame_source: Box<dyn FrameSource>,
    pub detector: Box<dyn DetectionAdapter>,
    pub display: Box<dyn DisplaySink>,
    released: bool,
}

impl Devices {
    pub fn new(
        frame_source: Box<dyn FrameSource>,
        detector: Box<dyn DetectionAdapter>,
        display: Box<dyn DisplaySink>,
    ) -> Self {
        Self {
            frame_source,
            detector,
            display,
            released: false,
        }
    }

    /// Closes the frame source and display. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.frame_source.close();
        self.display.close();
        log::debug!("Released frame source and display");
    }
}

impl Drop for Devices {
    fn drop(&mut self) {
        self.release();
    }
}

/// Opens devices on demand. Only called once the day is known to need a
/// session.
pub trait DeviceProvider {
    fn open(&mut self, ctx: &SessionContext) -> Result<Devices, Box<dyn std::error::Error>>;
}

impl<F> DeviceProvider for F
where
    F: FnMut(&SessionContext) -> Result<Devices, Box<dyn std::error::Error>>,
{
    fn open(&mut self, ctx: &SessionContext) -> Result<Devices, Box<dyn std::error::Error>> {
        self(ctx)
    }
}
