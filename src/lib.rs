//! feedex resolves URLs to the end of their redirect chains and discovers
//! the syndication feeds each resolved page advertises.
//!
//! Resolution shells out to `curl` and `wget`; outcomes are memoized per run
//! in a [`resolver::ResolutionCache`]. A [`batch::BatchOrchestrator`] drives
//! many URLs concurrently and produces a sorted URL to feeds mapping.

pub mod batch;
pub mod config;
pub mod core;
pub mod discovery;
pub mod process;
pub mod reporting;
pub mod resolver;
pub mod ui;
pub mod web;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used items
pub use batch::{BatchOrchestrator, BatchPolicy, BatchReport};
pub use config::{CliConfig, Config};
pub use core::{
    BatchResult, FeedSet, FeedexError, ResolutionOutcome, Result, UrlEntry, UrlError,
    UrlErrorKind,
};
pub use discovery::{FeedFinder, HttpFeedFinder};
pub use process::{ProcessRunner, SystemRunner, ToolPaths};
pub use resolver::{ResolutionCache, ResolveOptions, UrlResolver};
