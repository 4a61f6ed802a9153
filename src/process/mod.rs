//! External process execution
//!
//! This module runs the probe tools as child processes and locates
//! them on the system before a run starts.

pub mod runner;
pub mod tools;

// Re-export commonly used items
pub use runner::{CommandSpec, ProcessOutput, ProcessRunner, SystemRunner};
pub use tools::ToolPaths;
