use crate::display::domain::annotation::{Annotation, AnnotationKind};
use crate::shared::frame::Frame;

pub const BOX_THICKNESS: u32 = 2;

const RECOGNIZED_RGB: [u8; 3] = [0, 0, 255];
const UNKNOWN_RGB: [u8; 3] = [255, 0, 0];

/// Draws each annotation's rectangle outline onto the frame.
///
/// Recognized faces are outlined in blue, unknown faces in red. Boxes are
/// clipped to the frame.
pub fn paint(frame: &mut Frame, annotations: &[Annotation]) {
    let fw = frame.width();
    let fh = frame.height();
    for a in annotations {
        let r = a.region.clamp_to(fw, fh);
        if r.width == 0 || r.height == 0 {
            continue;
        }
        let color = match a.kind {
            AnnotationKind::Recognized => RECOGNIZED_RGB,
            AnnotationKind::Unknown => UNKNOWN_RGB,
        };

        let mut pixels = frame.as_ndarray_mut();
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                let on_edge = x < r.x + BOX_THICKNESS
                    || x + BOX_THICKNESS >= r.right()
                    || y < r.y + BOX_THICKNESS
                    || y + BOX_THICKNESS >= r.bottom();
                if on_edge {
                    for (c, value) in color.iter().enumerate() {
                        pixels[[y as usize, x as usize, c]] = *value;
                    }
                }
            }
        }
    }
}
