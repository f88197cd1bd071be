use serde::{Deserialize, Serialize};

/// Axis-aligned face region in pixel units.
///
/// Coordinates are unsigned: detectors clamp to the frame before building
/// a `Region`, so consumers never see negative geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a region from floating-point corners, clamped to the frame.
    ///
    /// Returns `None` when nothing of the box is left inside the frame.
    pub fn from_corners(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Self> {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let left = x1.max(0.0).min(fw);
        let top = y1.max(0.0).min(fh);
        let right = x2.max(0.0).min(fw);
        let bottom = y2.max(0.0).min(fh);
        let width = (right - left).round() as u32;
        let height = (bottom - top).round() as u32;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self::new(left as u32, top as u32, width, height))
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Shrinks the region so it lies within a `frame_width` × `frame_height` frame.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Self {
        let x = self.x.min(frame_width);
        let y = self.y.min(frame_height);
        Self {
            x,
            y,
            width: self.width.min(frame_width - x),
            height: self.height.min(frame_height - y),
        }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}
