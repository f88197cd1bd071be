//! Pre- and post-processing for YOLO face models: letterboxing, output row
//! decoding and greedy NMS. Kept free of `ort` so it is testable without a
//! model.

use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Confidence below which raw YOLO boxes are discarded.
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// NMS IoU threshold.
pub const NMS_IOU_THRESH: f64 = 0.45;

/// Padding value used around the letterboxed image (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

/// Mapping from letterbox coordinates back to the source frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f64,
    pub pad_x: u32,
    pub pad_y: u32,
}

impl Letterbox {
    fn unmap(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.pad_x as f64) / self.scale,
            (y - self.pad_y as f64) / self.scale,
        )
    }
}

/// A decoded box in source-frame coordinates, before NMS.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBox {
    pub bbox: [f64; 4],
    pub confidence: f64,
}

impl ScoredBox {
    pub fn to_region(&self, frame_width: u32, frame_height: u32) -> Option<Region> {
        let [x1, y1, x2, y2] = self.bbox;
        Region::from_corners(x1, y1, x2, y2, frame_width, frame_height)
    }
}

/// Letterbox-resize a frame into a `target_size` square NCHW float tensor.
pub fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let size = target_size as usize;
    let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, size, size), PAD_VALUE);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, pad_y as usize + y, pad_x as usize + x]] =
                    src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, Letterbox { scale, pad_x, pad_y })
}

/// Decode a `[1, features, detections]` or `[1, detections, features]`
/// output into boxes at or above `confidence`.
///
/// Each row starts `[cx, cy, w, h, conf, ...]`; trailing keypoints are
/// ignored.
pub fn decode(
    data: &[f32],
    shape: &[usize],
    letterbox: Letterbox,
    confidence: f64,
) -> Result<Vec<ScoredBox>, String> {
    if shape.len() != 3 {
        return Err(format!("unexpected YOLO output shape: {shape:?}"));
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 {
        return Ok(Vec::new());
    }
    if data.len() < num_dets * num_feats {
        return Err(format!(
            "YOLO output has {} values, expected {}",
            data.len(),
            num_dets * num_feats
        ));
    }

    let value = |det: usize, feat: usize| -> f64 {
        if transposed {
            data[feat * num_dets + det] as f64
        } else {
            data[det * num_feats + feat] as f64
        }
    };

    let mut boxes = Vec::new();
    for i in 0..num_dets {
        let conf = value(i, 4);
        if conf < confidence {
            continue;
        }
        let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
        let (x1, y1) = letterbox.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.unmap(cx + w / 2.0, cy + h / 2.0);
        boxes.push(ScoredBox {
            bbox: [x1, y1, x2, y2],
            confidence: conf,
        });
    }
    Ok(boxes)
}

/// Greedy NMS: highest confidence first, suppressing overlaps above
/// `iou_thresh`.
pub fn nms(mut boxes: Vec<ScoredBox>, iou_thresh: f64) -> Vec<ScoredBox> {
    boxes.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<ScoredBox> = Vec::new();
    for candidate in boxes {
        if keep
            .iter()
            .all(|kept| bbox_iou(&kept.bbox, &candidate.bbox) <= iou_thresh)
        {
            keep.push(candidate);
        }
    }
    keep
}

/// IoU between two `[x1, y1, x2, y2]` boxes.
pub fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}
