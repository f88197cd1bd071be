use std::time::Instant;

use chrono::NaiveDate;
use thiserror::Error;

use crate::detection::domain::label_correlator::{CorrelationError, Correlated};
use crate::display::domain::annotation::Annotation;
use crate::ledger::domain::attendance_record::AttendanceStatus;
use crate::ledger::domain::daily_ledger::DailyLedger;
use crate::ledger::domain::ledger_store::{PersistError, StorageError};
use crate::roster::domain::roster::RosterLoadError;
use crate::roster::domain::roster_source::RosterSource;
use crate::shared::clock::{seconds_between, Clock};
use crate::shared::config::{AttendanceConfig, ConfigError};
use crate::tracking::domain::presence_tracker::PresenceTracker;

use super::session_context::SessionContext;
use super::session_devices::{DeviceProvider, Devices};
use super::session_logger::{NullSessionLogger, SessionLogger};
use super::session_state::{SessionOutcome, SessionState, StopReason};
use super::stop_signal::StopSignal;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Roster(#[from] RosterLoadError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
    #[error("failed to open devices: {0}")]
    Devices(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("session has already run (state: {0})")]
    AlreadyRun(SessionState),
}

/// What the observation loop leaves behind for finalizing.
struct Observation {
    tracker: PresenceTracker,
    reason: StopReason,
    frames: usize,
    failed_reads: usize,
}

/// Runs one attendance session: checks whether the day is already
/// recorded, observes for one window, then finalizes and persists.
///
/// Single-use: a second `run` fails with [`SessionError::AlreadyRun`].
pub struct SessionController {
    config: AttendanceConfig,
    roster_source: Box<dyn RosterSource>,
    ledger: DailyLedger,
    devices: Box<dyn DeviceProvider>,
    clock: Box<dyn Clock>,
    logger: Box<dyn SessionLogger>,
    stop: StopSignal,
    date: Option<NaiveDate>,
    state: SessionState,
    transitions: Vec<SessionState>,
}

impl SessionController {
    pub fn new(
        config: AttendanceConfig,
        roster_source: Box<dyn RosterSource>,
        ledger: DailyLedger,
        devices: Box<dyn DeviceProvider>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            config,
            roster_source,
            ledger,
            devices,
            clock,
            logger: Box::new(NullSessionLogger),
            stop: StopSignal::new(),
            date: None,
            state: SessionState::Idle,
            transitions: vec![SessionState::Idle],
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn SessionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Records attendance for `date` instead of the clock's current day.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn transitions(&self) -> &[SessionState] {
        &self.transitions
    }

    pub fn run(&mut self) -> Result<SessionOutcome, SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyRun(self.state));
        }
        self.config.validate()?;
        let roster = self.roster_source.load()?;
        log::info!("Loaded roster with {} identities", roster.len());

        self.transition(SessionState::Checking);
        let date = self.date.unwrap_or_else(|| self.clock.now().date());
        let mut ctx = SessionContext::new(date, self.config.clone(), roster);
        let existing = self.ledger.load(date)?;
        if DailyLedger::is_day_recorded(date, &existing, &ctx.roster, ctx.config.skip_policy) {
            self.logger
                .info(&format!("Attendance already recorded for {date}; nothing to do"));
            self.transition(SessionState::SkippedAlreadyMarked);
            return Ok(SessionOutcome::skipped(date, existing));
        }

        let mut devices = self
            .devices
            .open(&ctx)
            .map_err(|e| SessionError::Devices(e.to_string()))?;
        ctx.correlator.validate(&devices.detector.labels())?;

        self.transition(SessionState::Observing);
        let observation = self.observe(&mut ctx, &mut devices);

        self.transition(SessionState::Finalizing);
        let finalized = observation.tracker.finalize(
            date,
            self.clock.now(),
            ctx.config.presence_threshold_seconds,
        );
        devices.release();
        drop(devices);

        let ledger = self
            .ledger
            .append_and_save(date, &existing, finalized.clone())?;
        self.transition(SessionState::Done);

        let present = finalized
            .iter()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count();
        self.logger.info(&format!(
            "Session for {date} finished ({}): {present} present, {} absent",
            observation.reason,
            finalized.len() - present
        ));
        self.logger.summary();

        Ok(SessionOutcome {
            date,
            state: self.state,
            stop_reason: Some(observation.reason),
            finalized,
            ledger,
            frames_processed: observation.frames,
            failed_reads: observation.failed_reads,
        })
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        log::debug!("Session: {} -> {next}", self.state);
        self.state = next;
        self.transitions.push(next);
    }

    fn observe(&mut self, ctx: &mut SessionContext, devices: &mut Devices) -> Observation {
        let window = ctx.config.time_interval_seconds;
        let delay = ctx.config.frame_delay();
        let window_start = self.clock.now();
        self.logger
            .info(&format!("Observing for {window}s starting {window_start}"));

        let mut tracker = PresenceTracker::new();
        let mut frames = 0usize;
        let mut failed_reads = 0usize;

        let reason = loop {
            if self.stop.is_requested() {
                break StopReason::Interrupted;
            }
            if seconds_between(window_start, self.clock.now()) >= window {
                break StopReason::WindowElapsed;
            }

            let started = Instant::now();
            let frame = match devices.frame_source.read() {
                Ok(frame) => frame,
                Err(e) => {
                    failed_reads += 1;
                    log::warn!("Frame acquisition failed: {e}; retrying");
                    self.clock.sleep(delay);
                    continue;
                }
            };
            self.logger.timing("capture", elapsed_ms(started));

            let started = Instant::now();
            let detections = match devices.detector.detect(&frame) {
                Ok(detections) => detections,
                Err(e) => {
                    log::error!("Detector failed on frame {}: {e}", frame.index());
                    break StopReason::DetectorFailed(e.to_string());
                }
            };
            self.logger.timing("detect", elapsed_ms(started));

            let now = self.clock.now();
            let mut annotations = Vec::with_capacity(detections.len());
            let mut unknown = 0usize;
            for resolved in ctx.correlator.resolve(&detections) {
                match resolved {
                    Correlated::Known { identity, region } => {
                        if tracker.observe(&identity, now) {
                            self.logger.info(&format!("Recognized {identity}"));
                        }
                        annotations.push(Annotation::recognized(region, &identity));
                    }
                    Correlated::Unknown { region } => {
                        unknown += 1;
                        annotations.push(tracker.observe_unknown(region));
                    }
                }
            }
            self.logger.metric("detections", detections.len() as f64);
            self.logger.metric("unknown", unknown as f64);

            let started = Instant::now();
            if let Err(e) = devices.display.show(&frame, &annotations) {
                log::warn!("Display failed on frame {}: {e}", frame.index());
            }
            self.logger.timing("render", elapsed_ms(started));

            frames += 1;
            self.logger
                .progress(frames, seconds_between(window_start, self.clock.now()), window);
            self.clock.sleep(delay);
        };
        log::info!("Observation stopped after {frames} frame(s): {reason}");

        Observation {
            tracker,
            reason,
            frames,
            failed_reads,
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
