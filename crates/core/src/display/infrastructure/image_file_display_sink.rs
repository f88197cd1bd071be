use std::path::{Path, PathBuf};

use crate::display::domain::annotation::Annotation;
use crate::display::domain::display_sink::DisplaySink;
use crate::shared::frame::Frame;

use super::box_painter;

/// Writes annotated frames as PNG files, one every `every` frames.
///
/// Files are named `frame-NNNNNN.png` after the frame index.
pub struct ImageFileDisplaySink {
    dir: PathBuf,
    every: usize,
    written: usize,
}

impl ImageFileDisplaySink {
    pub fn new(dir: impl Into<PathBuf>, every: usize) -> Self {
        Self {
            dir: dir.into(),
            every: every.max(1),
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> usize {
        self.written
    }

    fn path_for(&self, frame: &Frame) -> PathBuf {
        self.dir.join(format!("frame-{:06}.png", frame.index()))
    }
}

impl DisplaySink for ImageFileDisplaySink {
    fn show(
        &mut self,
        frame: &Frame,
        annotations: &[Annotation],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if frame.index() % self.every != 0 {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)?;

        let mut annotated = frame.clone();
        box_painter::paint(&mut annotated, annotations);

        let path = self.path_for(frame);
        let img = image::RgbImage::from_raw(
            annotated.width(),
            annotated.height(),
            annotated.into_data(),
        )
        .ok_or("Failed to create image from frame data")?;
        img.save(&path)?;
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) {
        if self.written > 0 {
            log::info!(
                "Wrote {} annotated frame(s) to {}",
                self.written,
                self.dir.display()
            );
            self.written = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::region::Region;

    #[test]
    fn test_writes_png_named_after_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ImageFileDisplaySink::new(dir.path().join("frames"), 1);

        sink.show(&Frame::blank(16, 12, 3), &[]).unwrap();

        let path = dir.path().join("frames").join("frame-000003.png");
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (16, 12));
        assert_eq!(sink.written(), 1);
    }

    #[test]
    fn test_annotations_are_painted() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ImageFileDisplaySink::new(dir.path(), 1);
        let annotations = vec![Annotation::unknown(Region::new(0, 0, 8, 8))];

        sink.show(&Frame::blank(16, 16, 0), &annotations).unwrap();

        let img = image::open(dir.path().join("frame-000000.png"))
            .unwrap()
            .to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(4, 4).0, [0, 0, 0]);
    }

    #[test]
    fn test_only_every_nth_frame_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ImageFileDisplaySink::new(dir.path(), 5);

        for i in 0..11 {
            sink.show(&Frame::blank(4, 4, i), &[]).unwrap();
        }

        assert_eq!(sink.written(), 3);
        assert!(dir.path().join("frame-000005.png").exists());
        assert!(!dir.path().join("frame-000004.png").exists());
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ImageFileDisplaySink::new(dir.path(), 1);
        sink.show(&Frame::blank(4, 4, 0), &[]).unwrap();
        sink.close();
        sink.close();
    }
}
