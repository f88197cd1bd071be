use std::path::Path;

use serde::Deserialize;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::detection_adapter::DetectionAdapter;
use crate::shared::frame::Frame;

/// On-disk form of a detection script.
///
/// ```json
/// { "repeat": false,
///   "frames": [ [ {"x": 10, "y": 20, "width": 80, "height": 80, "label": "alice"} ],
///               [ {"x": 300, "y": 40, "width": 60, "height": 60} ] ] }
/// ```
#[derive(Debug, Deserialize)]
struct DetectionScript {
    frames: Vec<Vec<Detection>>,
    #[serde(default)]
    repeat: bool,
}

/// Replays scripted detections by frame index.
///
/// Frames past the end of the script have no detections, unless `repeat`
/// is set, in which case the script loops.
pub struct ReplayDetectionAdapter {
    frames: Vec<Vec<Detection>>,
    repeat: bool,
}

impl ReplayDetectionAdapter {
    pub fn new(frames: Vec<Vec<Detection>>, repeat: bool) -> Self {
        Self { frames, repeat }
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read detections {}: {e}", path.display()))?;
        let script: DetectionScript = serde_json::from_str(&json)
            .map_err(|e| format!("invalid detections {}: {e}", path.display()))?;
        log::info!(
            "Loaded {} scripted frame(s) from {}",
            script.frames.len(),
            path.display()
        );
        Ok(Self::new(script.frames, script.repeat))
    }

    fn frame_detections(&self, index: usize) -> Option<&Vec<Detection>> {
        if self.repeat && !self.frames.is_empty() {
            self.frames.get(index % self.frames.len())
        } else {
            self.frames.get(index)
        }
    }
}

impl DetectionAdapter for ReplayDetectionAdapter {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        Ok(self
            .frame_detections(frame.index())
            .cloned()
            .unwrap_or_default())
    }

    fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .frames
            .iter()
            .flatten()
            .filter_map(|d| d.label.clone())
            .collect();
        labels.sort();
        labels.dedup();
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::region::Region;

    fn frame(index: usize) -> Frame {
        Frame::blank(8, 8, index)
    }

    fn alice() -> Detection {
        Detection::known(Region::new(1, 1, 4, 4), "alice")
    }

    #[test]
    fn test_replays_by_frame_index() {
        let mut adapter = ReplayDetectionAdapter::new(
            vec![vec![alice()], vec![], vec![alice(), Detection::unknown(Region::new(0, 0, 2, 2))]],
            false,
        );

        assert_eq!(adapter.detect(&frame(0)).unwrap(), vec![alice()]);
        assert!(adapter.detect(&frame(1)).unwrap().is_empty());
        assert_eq!(adapter.detect(&frame(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_past_end_is_empty_without_repeat() {
        let mut adapter = ReplayDetectionAdapter::new(vec![vec![alice()]], false);
        assert!(adapter.detect(&frame(5)).unwrap().is_empty());
    }

    #[test]
    fn test_repeat_loops_script() {
        let mut adapter = ReplayDetectionAdapter::new(vec![vec![alice()], vec![]], true);
        assert_eq!(adapter.detect(&frame(4)).unwrap(), vec![alice()]);
        assert!(adapter.detect(&frame(5)).unwrap().is_empty());
    }

    #[test]
    fn test_empty_script_with_repeat() {
        let mut adapter = ReplayDetectionAdapter::new(Vec::new(), true);
        assert!(adapter.detect(&frame(0)).unwrap().is_empty());
    }

    #[test]
    fn test_labels_are_unique_and_sorted() {
        let adapter = ReplayDetectionAdapter::new(
            vec![
                vec![Detection::known(Region::new(0, 0, 1, 1), "bob"), alice()],
                vec![alice(), Detection::unknown(Region::new(0, 0, 1, 1))],
            ],
            false,
        );
        assert_eq!(adapter.labels(), vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(
            &path,
            r#"{"repeat": true, "frames": [[{"x": 10, "y": 20, "width": 80, "height": 80, "label": "alice"}], [{"x": 1, "y": 2, "width": 3, "height": 4}]]}"#,
        )
        .unwrap();

        let mut adapter = ReplayDetectionAdapter::from_file(&path).unwrap();

        assert_eq!(
            adapter.detect(&frame(0)).unwrap(),
            vec![Detection::known(Region::new(10, 20, 80, 80), "alice")]
        );
        assert_eq!(
            adapter.detect(&frame(3)).unwrap(),
            vec![Detection::unknown(Region::new(1, 2, 3, 4))]
        );
    }

    #[test]
    fn test_from_file_rejects_negative_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(
            &path,
            r#"{"frames": [[{"x": -1, "y": 0, "width": 3, "height": 4}]]}"#,
        )
        .unwrap();
        assert!(ReplayDetectionAdapter::from_file(&path).is_err());
    }
}
