//! Configuration domain types

mod app_config;

pub use app_config::{AppConfig, CaptureConfig, DEFAULT_INPUT_FORMAT, DEFAULT_OUTPUT_DIR_NAME};
