use std::collections::HashMap;
use std::time::Instant;

/// Observer for session events: per-frame progress, stage timings and
/// metrics, and a closing summary.
pub trait SessionLogger: Send {
    /// Report progress through the observation window.
    fn progress(&mut self, frame: usize, elapsed_seconds: f64, window_seconds: f64);

    /// Record how long a named stage (`capture`, `detect`, `render`) took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a per-frame metric such as the number of detections.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn progress(&mut self, _frame: usize, _elapsed_seconds: f64, _window_seconds: f64) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logger for terminal runs. Collects timings and metrics for the summary
/// and reports progress every `throttle_frames` frames.
pub struct StdoutSessionLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames: usize,
    messages: Vec<String>,
}

impl StdoutSessionLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
            messages: Vec::new(),
        }
    }

    /// The formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let frames = self.frames;
        let mut lines = vec![format!("Session summary ({frames} frames, {elapsed_s:.1}s):")];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = total_ms / durations.len().max(1) as f64;
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let total: f64 = values.iter().sum();
            let avg = total / values.len().max(1) as f64;
            lines.push(format!("  {name}: avg {avg:.1}  total {total:.0}"));
        }

        if frames > 0 && elapsed_s > 0.0 {
            lines.push(format!("  Throughput: {:.1} fps", frames as f64 / elapsed_s));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

impl Default for StdoutSessionLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl SessionLogger for StdoutSessionLogger {
    fn progress(&mut self, frame: usize, elapsed_seconds: f64, window_seconds: f64) {
        self.frames = frame;
        if frame % self.throttle_frames == 0 {
            log::info!(
                "Observing: frame {frame}, {elapsed_seconds:.0}/{window_seconds:.0}s"
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_is_noop() {
        let mut logger = NullSessionLogger;
        logger.progress(1, 0.5, 120.0);
        logger.timing("detect", 5.0);
        logger.metric("detections", 2.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_and_metrics_recorded() {
        let mut logger = StdoutSessionLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.metric("unknown", 1.0);

        assert_eq!(logger.timings_for("detect").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.metrics_for("unknown").unwrap(), &[1.0]);
        assert!(logger.timings_for("render").is_none());
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = StdoutSessionLogger::new(10);
        logger.progress(4, 4.0, 5.0);
        logger.timing("capture", 1.0);
        logger.timing("render", 2.0);
        logger.metric("detections", 3.0);
        logger.metric("detections", 4.0);

        let summary = logger.summary_string().unwrap();

        assert!(summary.contains("Session summary (4 frames"));
        assert!(summary.contains("capture"));
        assert!(summary.contains("render"));
        assert!(summary.contains("detections: avg 3.5  total 7"));
    }

    #[test]
    fn test_empty_summary_is_none() {
        assert!(StdoutSessionLogger::default().summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_frame_count() {
        let mut logger = StdoutSessionLogger::new(3);
        for frame in 1..=7 {
            logger.progress(frame, frame as f64, 10.0);
        }
        assert_eq!(logger.frames, 7);
    }

    #[test]
    fn test_info_keeps_messages() {
        let mut logger = StdoutSessionLogger::new(1);
        logger.info("window opened");
        assert_eq!(logger.messages, vec!["window opened".to_string()]);
    }
}
