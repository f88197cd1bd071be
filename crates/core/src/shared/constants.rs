/// Length of one observation window.
pub const DEFAULT_TIME_INTERVAL_SECONDS: f64 = 120.0;

/// Observed duration an identity must strictly exceed to count as present.
pub const DEFAULT_PRESENCE_THRESHOLD_SECONDS: f64 = 60.0;

pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

/// Pause between frames in the observation loop.
pub const DEFAULT_FRAME_DELAY_MS: u64 = 100;

/// Ledger files are named `Attendance-YYYY-MM-DD.csv`.
pub const LEDGER_FILE_PREFIX: &str = "Attendance-";
pub const LEDGER_FILE_EXTENSION: &str = "csv";
pub const LEDGER_DATE_FORMAT: &str = "%Y-%m-%d";

pub const APP_DIR_NAME: &str = "attendance";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";
