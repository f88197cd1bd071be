pub mod clock;
pub mod config;
pub mod constants;
pub mod frame;
#[cfg(feature = "recognition")]
pub mod model_resolver;
pub mod region;
