use rustc_hash::FxHashMap;
use std::path::Path;

use crate::core::error::{FeedexError, Result};
use crate::core::types::{UrlEntry, parse_absolute_url};

/// Read and parse an input file of URLs.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// stray Latin-1 comment does not sink the whole list.
pub fn read_input_file<P: AsRef<Path>>(path: P) -> Result<Vec<UrlEntry>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let entries = parse_input(&String::from_utf8_lossy(&bytes));

    if entries.is_empty() {
        return Err(FeedexError::NoUrls(path.display().to_string()));
    }
    log::info!("Read {} URL(s) from {}", entries.len(), path.display());
    Ok(entries)
}

/// Parse input text into entries.
///
/// One URL per line. A line starting with a tab lists a feed already found
/// for the URL above it, which is the layout the txt writer produces.
/// Repeated URLs are merged into the first occurrence.
pub fn parse_input(content: &str) -> Vec<UrlEntry> {
    let mut entries: Vec<UrlEntry> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut current: Option<usize> = None;

    for (line_number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with('\t') {
            let feed = line.trim();
            match current {
                Some(_) if parse_absolute_url(feed).is_err() => {
                    log::debug!("Line {}: feed is not a URL, skipped: {feed}", line_number + 1);
                }
                Some(i) => {
                    entries[i].feeds.insert(feed);
                }
                None => log::debug!("Line {}: feed without a URL, skipped", line_number + 1),
            }
            continue;
        }

        let url = line.trim();
        if parse_absolute_url(url).is_err() {
            log::debug!("Line {}: not a URL, skipped: {url}", line_number + 1);
            current = None;
            continue;
        }

        let position = *index.entry(url.to_string()).or_insert_with(|| {
            entries.push(UrlEntry::new(url));
            entries.len() - 1
        });
        current = Some(position);
    }

    entries
}
