use ndarray::{ArrayView3, ArrayViewMut3};

use crate::shared::region::Region;

/// Number of interleaved channels in every frame (RGB).
pub const CHANNELS: u8 = 3;

/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// `index` is assigned by the frame source and increases by one per
/// successful read, so detection adapters can key off it.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (CHANNELS as usize),
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A black frame of the given size.
    pub fn blank(width: u32, height: u32, index: usize) -> Self {
        let len = (width as usize) * (height as usize) * (CHANNELS as usize);
        Self::new(vec![0; len], width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        CHANNELS
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the pixels under `region` (clamped to the frame) into a new
    /// frame carrying the same index. `None` when the clamped region is empty.
    pub fn crop(&self, region: &Region) -> Option<Frame> {
        let r = region.clamp_to(self.width, self.height);
        if r.width == 0 || r.height == 0 {
            return None;
        }
        let stride = self.width as usize * CHANNELS as usize;
        let row_len = r.width as usize * CHANNELS as usize;
        let mut data = Vec::with_capacity(row_len * r.height as usize);
        for y in r.y as usize..r.bottom() as usize {
            let start = y * stride + r.x as usize * CHANNELS as usize;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Some(Frame::new(data, r.width, r.height, self.index))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            CHANNELS as usize,
        )
    }
}
