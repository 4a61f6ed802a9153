//! Batch processing
//!
//! This module drives a set of URL entries through resolution and feed
//! discovery and aggregates the per-URL results.

pub mod orchestrator;

// Re-export commonly used items
pub use orchestrator::{BatchOrchestrator, BatchPolicy, BatchReport, describe_failure};
