use chrono::NaiveDate;

use crate::detection::domain::label_correlator::LabelCorrelator;
use crate::roster::domain::roster::Roster;
use crate::shared::config::AttendanceConfig;

/// Everything a session knows before it opens any device. Built once at
/// startup and handed to the components that need it.
pub struct SessionContext {
    pub date: NaiveDate,
    pub config: AttendanceConfig,
    pub roster: Roster,
    pub correlator: LabelCorrelator,
}

impl SessionContext {
    pub fn new(date: NaiveDate, config: AttendanceConfig, roster: Roster) -> Self {
        let correlator = LabelCorrelator::new(&roster);
        Self {
            date,
            config,
            roster,
            correlator,
        }
    }
}
