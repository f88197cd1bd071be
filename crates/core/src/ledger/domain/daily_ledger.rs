use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::attendance_record::AttendanceRecord;
use super::ledger_store::{LedgerStore, PersistError, StorageError};
use crate::roster::domain::identity::{Identity, RollNo};
use crate::roster::domain::roster::Roster;

/// When a day counts as already recorded, so no session should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipPolicy {
    /// Any record for the day means attendance was taken.
    #[default]
    AnyRecord,
    /// Only skip once every roster identity has a record for the day.
    FullRoster,
}

/// Per-date attendance ledger on top of a [`LedgerStore`].
///
/// Guarantees that a (date, roll number) pair is written at most once.
pub struct DailyLedger {
    store: Box<dyn LedgerStore>,
}

impl DailyLedger {
    pub fn new(store: Box<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Records stored for `date`, or an empty list when none exist.
    pub fn load(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StorageError> {
        Ok(self.store.load(date)?.unwrap_or_default())
    }

    pub fn already_marked(date: NaiveDate, records: &[AttendanceRecord], identity: &Identity) -> bool {
        records.iter().any(|r| r.is_for(date, identity))
    }

    /// Applies `policy` to decide whether `date` needs no further session.
    pub fn is_day_recorded(
        date: NaiveDate,
        records: &[AttendanceRecord],
        roster: &Roster,
        policy: SkipPolicy,
    ) -> bool {
        match policy {
            SkipPolicy::AnyRecord => records.iter().any(|r| r.date == date),
            SkipPolicy::FullRoster => roster
                .identities()
                .all(|identity| Self::already_marked(date, records, identity)),
        }
    }

    /// Appends `new_records` after `existing` and writes the merged table.
    ///
    /// Records for another date, or for an identity already marked on
    /// `date`, are dropped. When nothing is left to add the store is not
    /// touched. Returns the table as it now stands.
    pub fn append_and_save(
        &self,
        date: NaiveDate,
        existing: &[AttendanceRecord],
        new_records: Vec<AttendanceRecord>,
    ) -> Result<Vec<AttendanceRecord>, PersistError> {
        let mut seen: HashSet<RollNo> = existing
            .iter()
            .filter(|r| r.date == date)
            .map(|r| r.roll_no().clone())
            .collect();

        let mut merged = existing.to_vec();
        let mut appended = 0usize;
        for record in new_records {
            if record.date != date {
                log::warn!(
                    "Dropping record for {} dated {} from the {date} ledger",
                    record.identity,
                    record.date
                );
                continue;
            }
            if !seen.insert(record.roll_no().clone()) {
                log::warn!(
                    "Attendance for {} on {date} is already recorded; not marking again",
                    record.identity
                );
                continue;
            }
            merged.push(record);
            appended += 1;
        }

        if appended == 0 {
            log::debug!("No new attendance records for {date}; ledger left unchanged");
            return Ok(merged);
        }

        self.store.save(date, &merged)?;
        log::info!("Appended {appended} attendance record(s) to the {date} ledger");
        Ok(merged)
    }
}
