use std::path::{Path, PathBuf};
use std::process;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use attendance_core::capture::domain::frame_source::FrameSource;
#[cfg(feature = "camera")]
use attendance_core::capture::infrastructure::ffmpeg_capture_source::FfmpegCaptureSource;
use attendance_core::capture::infrastructure::blank_frame_source::BlankFrameSource;
use attendance_core::capture::infrastructure::image_sequence_source::ImageSequenceSource;
use attendance_core::detection::domain::detection_adapter::DetectionAdapter;
#[cfg(feature = "recognition")]
use attendance_core::detection::infrastructure::onnx_face_recognizer::OnnxFaceRecognizer;
use attendance_core::detection::infrastructure::replay_detection_adapter::ReplayDetectionAdapter;
use attendance_core::display::domain::display_sink::{DisplaySink, LogDisplaySink};
use attendance_core::display::infrastructure::image_file_display_sink::ImageFileDisplaySink;
use attendance_core::ledger::domain::daily_ledger::{DailyLedger, SkipPolicy};
use attendance_core::ledger::infrastructure::csv_ledger_store::CsvLedgerStore;
use attendance_core::roster::infrastructure::csv_roster_source::CsvRosterSource;
use attendance_core::session::session_context::SessionContext;
use attendance_core::session::session_controller::SessionController;
use attendance_core::session::session_devices::Devices;
use attendance_core::session::session_logger::StdoutSessionLogger;
use attendance_core::session::session_state::{SessionOutcome, SessionState};
use attendance_core::session::stop_signal::StopSignal;
use attendance_core::shared::clock::SystemClock;
use attendance_core::shared::config::AttendanceConfig;

/// Takes attendance from face detections over one observation window.
#[derive(Parser, Debug)]
#[command(name = "attendance")]
struct Cli {
    /// JSON config file (defaults to the per-user config if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Roster CSV with Name and Roll No columns.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Directory holding the daily Attendance-YYYY-MM-DD.csv files.
    #[arg(long)]
    ledger_dir: Option<PathBuf>,

    /// Length of the observation window in seconds.
    #[arg(long)]
    time_interval: Option<f64>,

    /// Seconds an identity must be tracked to count as present.
    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    frame_width: Option<u32>,

    #[arg(long)]
    frame_height: Option<u32>,

    /// Delay between frames in milliseconds.
    #[arg(long)]
    frame_delay_ms: Option<u64>,

    /// When a day counts as already recorded.
    #[arg(long, value_enum)]
    skip_policy: Option<SkipPolicyArg>,

    /// Scripted detections (JSON) to replay instead of running a model.
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Directory of images to use as the frame stream.
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Camera device, video file or stream URL (requires the `camera` feature).
    #[arg(long)]
    camera: Option<String>,

    /// Directory of enrolled face photos named by label (requires the
    /// `recognition` feature).
    #[arg(long)]
    gallery: Option<PathBuf>,

    /// Write annotated frames as PNG into this directory.
    #[arg(long)]
    render_dir: Option<PathBuf>,

    /// Write every Nth frame when --render-dir is set.
    #[arg(long, default_value = "1")]
    render_every: usize,

    /// Record attendance for this date (YYYY-MM-DD) instead of today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SkipPolicyArg {
    AnyRecord,
    FullRoster,
}

impl From<SkipPolicyArg> for SkipPolicy {
    fn from(arg: SkipPolicyArg) -> Self {
        match arg {
            SkipPolicyArg::AnyRecord => SkipPolicy::AnyRecord,
            SkipPolicyArg::FullRoster => SkipPolicy::FullRoster,
        }
    }
}

/// Where frames, detections and rendered output come from.
#[derive(Clone, Debug)]
struct DeviceArgs {
    detections: Option<PathBuf>,
    frames: Option<PathBuf>,
    camera: Option<String>,
    gallery: Option<PathBuf>,
    render_dir: Option<PathBuf>,
    render_every: usize,
}

impl From<&Cli> for DeviceArgs {
    fn from(cli: &Cli) -> Self {
        Self {
            detections: cli.detections.clone(),
            frames: cli.frames.clone(),
            camera: cli.camera.clone(),
            gallery: cli.gallery.clone(),
            render_dir: cli.render_dir.clone(),
            render_every: cli.render_every,
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let config = merged_config(&cli)?;
    let roster_path = config
        .roster_path
        .clone()
        .ok_or("No roster given: pass --roster or set roster_path in the config")?;
    log::info!(
        "Ledger directory: {}, window {}s, threshold {}s",
        config.ledger_dir.display(),
        config.time_interval_seconds,
        config.presence_threshold_seconds
    );

    let stop = StopSignal::new();
    let handle = stop.clone();
    ctrlc::set_handler(move || {
        log::info!("Interrupt received; finishing the session");
        handle.request();
    })?;

    let device_args = DeviceArgs::from(&cli);
    let provider = move |ctx: &SessionContext| -> Result<Devices, Box<dyn std::error::Error>> {
        open_devices(&device_args, &ctx.config)
    };

    let ledger = DailyLedger::new(Box::new(CsvLedgerStore::new(config.ledger_dir.clone())));
    let mut session = SessionController::new(
        config,
        Box::new(CsvRosterSource::new(roster_path)),
        ledger,
        Box::new(provider),
        Box::new(SystemClock),
    )
    .with_logger(Box::new(StdoutSessionLogger::default()))
    .with_stop_signal(stop);
    if let Some(date) = cli.date {
        session = session.with_date(date);
    }

    let outcome = session.run()?;
    print_outcome(&outcome);
    Ok(())
}

/// Defaults, then the config file, then command-line flags.
fn merged_config(cli: &Cli) -> Result<AttendanceConfig, Box<dyn std::error::Error>> {
    let mut config = AttendanceConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.roster {
        config.roster_path = Some(path.clone());
    }
    if let Some(dir) = &cli.ledger_dir {
        config.ledger_dir = dir.clone();
    }
    if let Some(secs) = cli.time_interval {
        config.time_interval_seconds = secs;
    }
    if let Some(secs) = cli.threshold {
        config.presence_threshold_seconds = secs;
    }
    if let Some(w) = cli.frame_width {
        config.frame_width = w;
    }
    if let Some(h) = cli.frame_height {
        config.frame_height = h;
    }
    if let Some(ms) = cli.frame_delay_ms {
        config.frame_delay_ms = ms;
    }
    if let Some(policy) = cli.skip_policy {
        config.skip_policy = policy.into();
    }
    config.validate()?;
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match (&cli.detections, &cli.gallery) {
        (None, None) => return Err("One of --detections or --gallery is required".into()),
        (Some(_), Some(_)) => {
            return Err("--detections and --gallery are mutually exclusive".into())
        }
        _ => {}
    }
    if cli.frames.is_some() && cli.camera.is_some() {
        return Err("--frames and --camera are mutually exclusive".into());
    }
    if let Some(path) = &cli.detections {
        require_exists(path, "Detections file")?;
    }
    if let Some(dir) = &cli.frames {
        require_exists(dir, "Frames directory")?;
    }
    if let Some(dir) = &cli.gallery {
        require_exists(dir, "Gallery directory")?;
        if !cfg!(feature = "recognition") {
            return Err("--gallery requires building with the `recognition` feature".into());
        }
    }
    if cli.camera.is_some() && !cfg!(feature = "camera") {
        return Err("--camera requires building with the `camera` feature".into());
    }
    if cli.render_every == 0 {
        return Err("Render interval must be at least 1".into());
    }
    Ok(())
}

fn require_exists(path: &Path, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(())
    } else {
        Err(format!("{what} not found: {}", path.display()).into())
    }
}

fn open_devices(
    args: &DeviceArgs,
    config: &AttendanceConfig,
) -> Result<Devices, Box<dyn std::error::Error>> {
    let detector = open_detector(args)?;
    let frame_source = open_frame_source(args, config)?;
    let display: Box<dyn DisplaySink> = match &args.render_dir {
        Some(dir) => Box::new(ImageFileDisplaySink::new(dir.clone(), args.render_every)),
        None => Box::new(LogDisplaySink),
    };
    Ok(Devices::new(frame_source, detector, display))
}

fn open_detector(args: &DeviceArgs) -> Result<Box<dyn DetectionAdapter>, Box<dyn std::error::Error>> {
    if let Some(path) = &args.detections {
        return Ok(Box::new(ReplayDetectionAdapter::from_file(path)?));
    }
    match &args.gallery {
        #[cfg(feature = "recognition")]
        Some(dir) => Ok(Box::new(OnnxFaceRecognizer::load(dir, None)?)),
        #[cfg(not(feature = "recognition"))]
        Some(_) => Err("face recognition is not available in this build".into()),
        None => Err("no detection source configured".into()),
    }
}

fn open_frame_source(
    args: &DeviceArgs,
    config: &AttendanceConfig,
) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    let (width, height) = (config.frame_width, config.frame_height);
    if let Some(dir) = &args.frames {
        return Ok(Box::new(ImageSequenceSource::open(dir, width, height)?));
    }
    match &args.camera {
        #[cfg(feature = "camera")]
        Some(input) => Ok(Box::new(FfmpegCaptureSource::open(input, width, height)?)),
        #[cfg(not(feature = "camera"))]
        Some(_) => Err("camera capture is not available in this build".into()),
        None => Ok(Box::new(BlankFrameSource::new(width, height))),
    }
}

fn print_outcome(outcome: &SessionOutcome) {
    if outcome.state == SessionState::SkippedAlreadyMarked {
        println!("Attendance already recorded for {}", outcome.date);
        return;
    }

    match &outcome.stop_reason {
        Some(reason) => println!("Attendance for {} ({reason}):", outcome.date),
        None => println!("Attendance for {}:", outcome.date),
    }
    if outcome.finalized.is_empty() {
        println!("  nobody was recognized");
    }
    for record in &outcome.finalized {
        println!(
            "  {:<24} {:>7.1}s  {}",
            record.identity.to_string(),
            record.observed_seconds,
            record.status
        );
    }
    println!(
        "{} frame(s) processed, {} failed read(s); {} record(s) in the ledger",
        outcome.frames_processed,
        outcome.failed_reads,
        outcome.ledger.len()
    );
}
