//! Command-line front end, image I/O, configuration and errors

/// Command-line parsing and the solve pipeline
pub mod cli;
/// Constants and defaults
pub mod configuration;
/// Error type shared by the crate
pub mod error;
/// PNG sample loading and result export
pub mod image;
/// Terminal progress display
pub mod progress;
