//! Reporting
//!
//! This module handles structured logging for the application.

pub mod logging;

// Re-export commonly used items
pub use logging::init_logger;
