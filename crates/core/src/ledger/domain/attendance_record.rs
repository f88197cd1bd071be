use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::roster::domain::identity::{Identity, RollNo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Present iff the observed duration strictly exceeds the threshold.
    pub fn classify(observed_seconds: f64, threshold_seconds: f64) -> Self {
        if observed_seconds > threshold_seconds {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "Present"),
            AttendanceStatus::Absent => write!(f, "Absent"),
        }
    }
}

/// One finalized attendance decision for one identity on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub identity: Identity,
    pub observed_seconds: f64,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn roll_no(&self) -> &RollNo {
        self.identity.roll_no()
    }

    /// True when this record is for `identity` on `date`.
    pub fn is_for(&self, date: NaiveDate, identity: &Identity) -> bool {
        self.date == date && self.identity.roll_no() == identity.roll_no()
    }
}
