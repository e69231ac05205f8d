// Darkbay Exporter Library - Public API

// Re-export error types
pub mod error;
pub use error::{ExporterError, Result};

// Module declarations
pub mod commands;
pub mod core;

// Re-export commonly used types
pub use crate::core::collectors::DeviceCollector;
pub use crate::core::config::ExporterConfig;

// Initialize logging; RUST_LOG still wins when set
pub fn init_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
