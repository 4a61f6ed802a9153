//! Input parsing and feed discovery
//!
//! This module reads the URLs to process and finds the syndication
//! feeds a resolved page advertises.

pub mod feeds;
pub mod input;

// Re-export commonly used items
pub use feeds::{FeedFinder, HttpFeedFinder, feeds_in_document, scan_feed_links};
pub use input::{parse_input, read_input_file};
