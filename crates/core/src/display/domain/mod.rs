pub mod annotation;
pub mod display_sink;
