use std::path::{Path, PathBuf};

use crate::capture::domain::frame_source::{FrameAcquisitionError, FrameSource};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Plays the images of a directory as a looping camera feed.
///
/// Files are taken in name order and resized to the configured frame size.
/// A file that fails to decode is reported as a failed read and skipped on
/// the next call.
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    width: u32,
    height: u32,
    cursor: usize,
    next_index: usize,
    closed: bool,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path, width: u32, height: u32) -> Result<Self, Box<dyn std::error::Error>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        files.sort();
        if files.is_empty() {
            return Err(format!("No images found in {}", dir.display()).into());
        }
        log::info!("Replaying {} image(s) from {}", files.len(), dir.display());
        Ok(Self {
            files,
            width,
            height,
            cursor: 0,
            next_index: 0,
            closed: false,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn read(&mut self) -> Result<Frame, FrameAcquisitionError> {
        if self.closed {
            return Err(FrameAcquisitionError::Closed);
        }
        let path = &self.files[self.cursor];
        self.cursor = (self.cursor + 1) % self.files.len();

        let img = image::open(path)
            .map_err(|e| FrameAcquisitionError::Decode(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let img = if img.dimensions() == (self.width, self.height) {
            img
        } else {
            image::imageops::resize(
                &img,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            )
        };

        let frame = Frame::new(img.into_raw(), self.width, self.height, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_image(dir: &Path, name: &str, rgb: [u8; 3]) {
        let mut img = image::RgbImage::new(20, 10);
        for p in img.pixels_mut() {
            *p = image::Rgb(rgb);
        }
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_reads_in_name_order_and_loops() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png", [0, 255, 0]);
        write_image(dir.path(), "a.png", [255, 0, 0]);
        let mut source = ImageSequenceSource::open(dir.path(), 20, 10).unwrap();

        let first = source.read().unwrap();
        let second = source.read().unwrap();
        let third = source.read().unwrap();

        assert_eq!(&first.data()[..3], &[255, 0, 0]);
        assert_eq!(&second.data()[..3], &[0, 255, 0]);
        assert_eq!(&third.data()[..3], &[255, 0, 0]);
        assert_eq!(third.index(), 2);
    }

    #[test]
    fn test_resizes_to_frame_size() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "a.png", [10, 20, 30]);
        let mut source = ImageSequenceSource::open(dir.path(), 8, 6).unwrap();

        let frame = source.read().unwrap();

        assert_eq!((frame.width(), frame.height()), (8, 6));
    }

    #[test]
    fn test_non_images_ignored_and_empty_dir_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        assert!(ImageSequenceSource::open(dir.path(), 8, 6).is_err());
    }

    #[test]
    fn test_undecodable_file_is_transient() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"not a png").unwrap();
        write_image(dir.path(), "b.png", [1, 2, 3]);
        let mut source = ImageSequenceSource::open(dir.path(), 20, 10).unwrap();

        assert!(matches!(source.read(), Err(FrameAcquisitionError::Decode(_))));
        let frame = source.read().unwrap();
        assert_eq!(frame.index(), 0);
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("x/face.JPG")));
        assert!(!is_image(Path::new("x/face.csv")));
        assert!(!is_image(Path::new("x/face")));
    }
}
