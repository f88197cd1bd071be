use crate::shared::frame::Frame;

use super::detection::Detection;

/// Finds and labels faces in a frame.
///
/// Implementations report at most one detection per label per frame, in
/// their own output order. Stateful implementations are allowed, hence
/// `&mut self`.
pub trait DetectionAdapter: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;

    /// Every label this adapter can emit. Checked against the roster before
    /// observation starts.
    fn labels(&self) -> Vec<String>;
}
