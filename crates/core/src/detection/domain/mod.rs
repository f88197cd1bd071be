pub mod detection;
pub mod detection_adapter;
pub mod label_correlator;
