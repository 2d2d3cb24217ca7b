// Command handlers module
pub mod authorize;
pub mod devices;
pub mod run;
pub mod version;

// Re-exports for cleaner imports
pub use authorize::execute as authorize;
pub use devices::execute as devices;
pub use run::execute as run;
pub use version::execute as version;
