//! URL resolution
//!
//! This module follows redirect chains with external probe tools,
//! classifies the tools' diagnostics and memoizes outcomes per run.

pub mod cache;
pub mod classify;
#[allow(clippy::module_inception)]
pub mod resolver;

// Re-export commonly used items
pub use cache::{CacheDecision, CacheEntry, ResolutionCache};
pub use classify::{SpiderClassifier, SpiderOutcome, WgetSpiderClassifier, extract_urls};
pub use resolver::{ResolveOptions, UrlResolver};
