use std::fmt;

use chrono::NaiveDate;

use crate::ledger::domain::attendance_record::{AttendanceRecord, AttendanceStatus};

/// Lifecycle of one attendance session.
///
/// `Idle → Checking → Observing → Finalizing → Done`, or
/// `Idle → Checking → SkippedAlreadyMarked` when the day is already recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Checking,
    Observing,
    Finalizing,
    Done,
    SkippedAlreadyMarked,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::SkippedAlreadyMarked)
    }

    /// Whether the controller may move from `self` to `next`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Checking)
                | (Checking, Observing)
                | (Checking, SkippedAlreadyMarked)
                | (Observing, Finalizing)
                | (Finalizing, Done)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Checking => "checking",
            Self::Observing => "observing",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::SkippedAlreadyMarked => "skipped (already marked)",
        };
        f.write_str(name)
    }
}

/// Why the observation window closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    WindowElapsed,
    Interrupted,
    DetectorFailed(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WindowElapsed => f.write_str("observation window elapsed"),
            Self::Interrupted => f.write_str("interrupted"),
            Self::DetectorFailed(e) => write!(f, "detector failed: {e}"),
        }
    }
}

/// What a finished session did.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub date: NaiveDate,
    pub state: SessionState,
    /// `None` when the session was skipped.
    pub stop_reason: Option<StopReason>,
    /// Records produced by this session's window, before de-duplication.
    pub finalized: Vec<AttendanceRecord>,
    /// The day's ledger as it stands after the session.
    pub ledger: Vec<AttendanceRecord>,
    pub frames_processed: usize,
    pub failed_reads: usize,
}

impl SessionOutcome {
    pub(crate) fn skipped(date: NaiveDate, ledger: Vec<AttendanceRecord>) -> Self {
        Self {
            date,
            state: SessionState::SkippedAlreadyMarked,
            stop_reason: None,
            finalized: Vec::new(),
            ledger,
            frames_processed: 0,
            failed_reads: 0,
        }
    }

    pub fn present(&self) -> impl Iterator<Item = &AttendanceRecord> {
        self.finalized
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use SessionState::*;

    #[rstest]
    #[case(Idle, Checking, true)]
    #[case(Checking, Observing, true)]
    #[case(Checking, SkippedAlreadyMarked, true)]
    #[case(Observing, Finalizing, true)]
    #[case(Finalizing, Done, true)]
    #[case(Idle, Observing, false)]
    #[case(Observing, Done, false)]
    #[case(SkippedAlreadyMarked, Observing, false)]
    #[case(Done, Idle, false)]
    fn test_transitions(
        #[case] from: SessionState,
        #[case] to: SessionState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_terminal_states() {
        assert!(Done.is_terminal());
        assert!(SkippedAlreadyMarked.is_terminal());
        assert!(!Finalizing.is_terminal());
    }
}
