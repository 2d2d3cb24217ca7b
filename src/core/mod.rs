// Core business logic module

pub mod browser;
pub mod config;
pub mod devices;
pub mod extract;
pub mod mail;
pub mod monitor;
pub mod report;
pub mod status_log;

// Re-export commonly used items
pub use config::AppConfig;
pub use devices::{load_devices, DeviceDescriptor, DeviceKind};
pub use monitor::{EmailOutcome, RunSummary, SupplyMonitor};
pub use report::{Report, ReportEntry};
pub use status_log::StatusLog;
