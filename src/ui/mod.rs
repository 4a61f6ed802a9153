//! User interface and interaction
//!
//! This module contains all components related to user interaction,
//! including CLI parsing, output rendering and progress reporting.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used items
pub use cli::{Cli, cli_to_config};
pub use output::{render, report_errors, write_results};
pub use progress::ProgressReporter;
