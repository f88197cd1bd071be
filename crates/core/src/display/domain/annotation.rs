use crate::roster::domain::identity::Identity;
use crate::shared::region::Region;

pub const UNKNOWN_CAPTION: &str = "UNKNOWN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Recognized,
    Unknown,
}

/// A box and caption to draw over a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub region: Region,
    pub caption: String,
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn recognized(region: Region, identity: &Identity) -> Self {
        Self {
            region,
            caption: format!("Detected: {}", identity.name()),
            kind: AnnotationKind::Recognized,
        }
    }

    pub fn unknown(region: Region) -> Self {
        Self {
            region,
            caption: UNKNOWN_CAPTION.to_string(),
            kind: AnnotationKind::Unknown,
        }
    }
}
