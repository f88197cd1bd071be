use serde::{Deserialize, Serialize};

use crate::shared::region::Region;

/// One face found in a frame, with the detector's identity label if it
/// recognised the face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(flatten)]
    pub region: Region,
    #[serde(default)]
    pub label: Option<String>,
}

impl Detection {
    pub fn known(region: Region, label: &str) -> Self {
        Self {
            region,
            label: Some(label.to_string()),
        }
    }

    pub fn unknown(region: Region) -> Self {
        Self {
            region,
            label: None,
        }
    }
}
