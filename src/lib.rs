// Supplymon Library - Public API

// Re-export error types
pub mod error;
pub use error::{ExtractionError, Result, SupplyError};

// Module declarations
pub mod cli;
pub mod commands;
pub mod core;

// Re-export commonly used types
pub use crate::core::config::AppConfig;
pub use crate::core::devices::{DeviceDescriptor, DeviceKind};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
