pub mod session_context;
pub mod session_controller;
pub mod session_devices;
pub mod session_logger;
pub mod session_state;
pub mod stop_signal;
