use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::display::domain::annotation::Annotation;
use crate::ledger::domain::attendance_record::{AttendanceRecord, AttendanceStatus};
use crate::roster::domain::identity::{Identity, RollNo};
use crate::shared::clock::seconds_between;
use crate::shared::region::Region;

/// An identity seen at least once in the current window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedRecognition {
    pub identity: Identity,
    pub first_seen: NaiveDateTime,
}

/// Accumulates first sightings over one observation window.
///
/// `first_seen` is fixed by the first detection and never advanced: the
/// observed duration runs from the first sighting to window close, gaps in
/// recognition included. Identities are reported in first-seen order.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    tracked: Vec<TrackedRecognition>,
    index: HashMap<RollNo, usize>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sighting of `identity` at `now`.
    ///
    /// Returns `true` if this is the identity's first sighting in the window.
    pub fn observe(&mut self, identity: &Identity, now: NaiveDateTime) -> bool {
        if self.index.contains_key(identity.roll_no()) {
            return false;
        }
        self.index
            .insert(identity.roll_no().clone(), self.tracked.len());
        self.tracked.push(TrackedRecognition {
            identity: identity.clone(),
            first_seen: now,
        });
        log::debug!("First sighting of {identity} at {now}");
        true
    }

    /// Annotation for a face that matched no roster identity. Tracked state
    /// is not touched.
    pub fn observe_unknown(&self, region: Region) -> Annotation {
        Annotation::unknown(region)
    }

    pub fn get(&self, roll_no: &RollNo) -> Option<&TrackedRecognition> {
        self.index.get(roll_no).map(|&idx| &self.tracked[idx])
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Closes the window and classifies every tracked identity.
    ///
    /// Identities never seen produce no record at all; seen ones are
    /// `Present` when `now - first_seen` strictly exceeds
    /// `threshold_seconds`, `Absent` otherwise.
    pub fn finalize(
        self,
        date: NaiveDate,
        now: NaiveDateTime,
        threshold_seconds: f64,
    ) -> Vec<AttendanceRecord> {
        self.tracked
            .into_iter()
            .map(|t| {
                let observed_seconds = seconds_between(t.first_seen, now);
                let status = AttendanceStatus::classify(observed_seconds, threshold_seconds);
                log::debug!(
                    "{}: observed {observed_seconds:.1}s -> {status}",
                    t.identity
                );
                AttendanceRecord {
                    date,
                    identity: t.identity,
                    observed_seconds,
                    status,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::DEFAULT_PRESENCE_THRESHOLD_SECONDS;
    use approx::assert_relative_eq;
    use chrono::Duration;
    use rstest::rstest;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn t(seconds: i64) -> NaiveDateTime {
        date().and_hms_opt(9, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn alice() -> Identity {
        Identity::new("alice", RollNo::new("1"))
    }

    fn bob() -> Identity {
        Identity::new("bob", RollNo::new("2"))
    }

    #[test]
    fn test_first_seen_is_never_advanced() {
        let mut tracker = PresenceTracker::new();
        assert!(tracker.observe(&alice(), t(1)));
        assert!(!tracker.observe(&alice(), t(5)));
        assert!(!tracker.observe(&alice(), t(9)));

        assert_eq!(tracker.get(alice().roll_no()).unwrap().first_seen, t(1));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_observe_unknown_leaves_state_alone() {
        let tracker = PresenceTracker::new();
        let annotation = tracker.observe_unknown(Region::new(1, 2, 3, 4));
        assert_eq!(annotation.caption, "UNKNOWN");
        assert!(tracker.is_empty());
    }

    #[rstest]
    #[case::over(61, AttendanceStatus::Present)]
    #[case::under(59, AttendanceStatus::Absent)]
    #[case::exact(60, AttendanceStatus::Absent)]
    fn test_threshold_boundaries(#[case] seen_for: i64, #[case] expected: AttendanceStatus) {
        let mut tracker = PresenceTracker::new();
        tracker.observe(&alice(), t(0));

        let records = tracker.finalize(date(), t(seen_for), DEFAULT_PRESENCE_THRESHOLD_SECONDS);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, expected);
        assert_relative_eq!(records[0].observed_seconds, seen_for as f64);
    }

    #[test]
    fn test_absent_and_present_both_recorded_in_first_seen_order() {
        let mut tracker = PresenceTracker::new();
        tracker.observe(&bob(), t(100));
        tracker.observe(&alice(), t(0));

        let records = tracker.finalize(date(), t(120), 60.0);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identity, bob());
        assert_eq!(records[0].status, AttendanceStatus::Absent);
        assert_eq!(records[1].identity, alice());
        assert_eq!(records[1].status, AttendanceStatus::Present);
        assert!(records.iter().all(|r| r.date == date()));
    }

    #[test]
    fn test_never_seen_identity_has_no_record() {
        let mut tracker = PresenceTracker::new();
        tracker.observe(&alice(), t(0));

        let records = tracker.finalize(date(), t(120), 60.0);

        assert!(records.iter().all(|r| r.identity != bob()));
    }

    #[test]
    fn test_empty_window_finalizes_to_nothing() {
        let records = PresenceTracker::new().finalize(date(), t(120), 60.0);
        assert!(records.is_empty());
    }

    #[test]
    fn test_gap_in_recognition_does_not_reset_duration() {
        let mut tracker = PresenceTracker::new();
        tracker.observe(&alice(), t(0));
        // not seen again until the very end
        tracker.observe(&alice(), t(119));

        let records = tracker.finalize(date(), t(120), 60.0);

        assert_relative_eq!(records[0].observed_seconds, 120.0);
        assert_eq!(records[0].status, AttendanceStatus::Present);
    }

    #[test]
    fn test_same_roll_no_counts_as_same_identity() {
        let mut tracker = PresenceTracker::new();
        tracker.observe(&Identity::new("alice", RollNo::new("1")), t(0));
        assert!(!tracker.observe(&Identity::new("ALICE", RollNo::new("1")), t(1)));
    }
}
