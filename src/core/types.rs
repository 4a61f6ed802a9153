use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::core::constants::exit_codes;
use crate::core::error::{FeedexError, Result};

/// A user-supplied or discovered URL together with the feeds already known for it.
///
/// Entries are built from the input file (where tab-indented lines carry
/// previously discovered feeds) or from a single `--url` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// The URL as it appeared in the input, trimmed
    pub url: String,
    /// Feeds recorded for this URL by an earlier run
    pub feeds: FeedSet,
}

impl UrlEntry {
    /// Create an entry with no known feeds.
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into().trim().to_string(),
            feeds: FeedSet::default(),
        }
    }

    /// Create an entry carrying feeds from a previous run.
    pub fn with_feeds<S, I, F>(url: S, feeds: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self {
            url: url.into().trim().to_string(),
            feeds: feeds.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether an earlier run already found feeds for this URL.
    pub fn has_feeds(&self) -> bool {
        !self.feeds.is_empty()
    }
}

/// Parse `url` and require it to be absolute with a host.
///
/// # Examples
/// ```
/// use feedex::core::types::parse_absolute_url;
///
/// assert!(parse_absolute_url("https://example.com/blog").is_ok());
/// assert!(parse_absolute_url("example.com").is_err());
/// ```
pub fn parse_absolute_url(url: &str) -> Result<url::Url> {
    let parsed =
        url::Url::parse(url.trim()).map_err(|_| FeedexError::InvalidUrl(url.to_string()))?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(FeedexError::InvalidUrl(url.to_string())),
    }
}

/// Numeric check used to reject bare status codes reported in place of a URL.
///
/// Accepts what a loose numeric parser would: optional sign, decimals and
/// exponents, surrounding whitespace.
pub fn is_numeric(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .is_ok_and(|number| number.is_finite())
}

/// Deduplicated, ascending set of feed URLs for one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedSet(BTreeSet<String>);

impl FeedSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert<S: Into<String>>(&mut self, feed: S) -> bool {
        self.0.insert(feed.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Union another set into this one.
    pub fn merge(&mut self, other: FeedSet) {
        self.0.extend(other.0);
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for FeedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FeedSet(
            iter.into_iter()
                .map(Into::into)
                .map(|feed: String| feed.trim().to_string())
                .filter(|feed| !feed.is_empty())
                .collect(),
        )
    }
}

/// Outcome of resolving one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Terminus of a successfully followed redirect chain
    Resolved(String),
    /// Classified tool exit code or the synthetic broken-link code
    Failure(i32),
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }

    /// Resolved URL, if this outcome is usable for discovery.
    ///
    /// Empty or numeric targets are never usable.
    pub fn resolved_url(&self) -> Option<&str> {
        match self {
            ResolutionOutcome::Resolved(url) if !url.is_empty() && !is_numeric(url) => Some(url),
            _ => None,
        }
    }

    /// Failure code worth re-probing on the next lookup.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolutionOutcome::Failure(code) if exit_codes::is_retryable(*code))
    }

    /// Failure code that stays cached for the rest of the run.
    pub fn is_dead(&self) -> bool {
        matches!(
            self,
            ResolutionOutcome::Failure(code)
                if exit_codes::is_dead(*code) && !exit_codes::is_retryable(*code)
        )
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionOutcome::Resolved(url) => write!(f, "{url}"),
            ResolutionOutcome::Failure(code) => write!(f, "{code}"),
        }
    }
}

/// Final mapping from (possibly redirect-updated) URL to its feeds, sorted by key.
pub type BatchResult = BTreeMap<String, FeedSet>;

/// What went wrong for a single URL in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlErrorKind {
    /// No parseable host, never sent to the probe tools
    MalformedUrl,
    /// Resolution ended in a failure code
    Resolution,
    /// A probe tool could not be started
    Spawn,
    /// The feed finder raised an error
    Discovery,
}

/// Per-URL error accumulated alongside the batch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlError {
    pub url: String,
    pub kind: UrlErrorKind,
    /// Failure or HTTP status code, when one applies
    pub code: Option<i64>,
    pub message: String,
}

impl UrlError {
    pub fn new<U, M>(url: U, kind: UrlErrorKind, code: Option<i64>, message: M) -> Self
    where
        U: Into<String>,
        M: Into<String>,
    {
        Self {
            url: url.into(),
            kind,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for UrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "Error {code}: '{}' for URL:\n\t{}", self.message, self.url),
            None => write!(f, "Error: '{}' for URL:\n\t{}", self.message, self.url),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn test_feed_set__dedups_and_sorts() {
        let feeds: FeedSet = vec![
            "https://b.example/feed",
            "https://a.example/rss",
            "https://b.example/feed",
        ]
        .into_iter()
        .collect();

        assert_eq!(
            feeds.to_vec(),
            vec!["https://a.example/rss", "https://b.example/feed"]
        );
    }

    #[test]
    fn test_feed_set__drops_blank_entries() {
        let feeds: FeedSet = vec!["  ", "https://a.example/rss "].into_iter().collect();

        assert_eq!(feeds.to_vec(), vec!["https://a.example/rss"]);
    }

    #[test]
    fn test_feed_set__serializes_as_array() {
        let feeds: FeedSet = vec!["https://a.example/rss"].into_iter().collect();

        assert_eq!(
            serde_json::to_string(&feeds).unwrap(),
            r#"["https://a.example/rss"]"#
        );
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("404"));
        assert!(is_numeric(" -22 "));
        assert!(is_numeric("1.5"));
        assert!(is_numeric("1e3"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("inf"));
        assert!(!is_numeric("NaN"));
        assert!(!is_numeric("https://example.com"));
    }

    #[test]
    fn test_parse_absolute_url() {
        assert!(parse_absolute_url("http://example.com").is_ok());
        assert!(parse_absolute_url("  https://example.com/a?b=c  ").is_ok());
        assert!(parse_absolute_url("example.com").is_err());
        assert!(parse_absolute_url("mailto:someone@example.com").is_err());
        assert!(parse_absolute_url("").is_err());
    }

    #[test]
    fn test_outcome__resolved_url_rejects_numeric_and_empty() {
        assert_eq!(
            ResolutionOutcome::Resolved("https://example.com/".into()).resolved_url(),
            Some("https://example.com/")
        );
        assert_eq!(ResolutionOutcome::Resolved("200".into()).resolved_url(), None);
        assert_eq!(ResolutionOutcome::Resolved(String::new()).resolved_url(), None);
        assert_eq!(ResolutionOutcome::Failure(6).resolved_url(), None);
    }

    #[test]
    fn test_outcome__classification() {
        assert!(ResolutionOutcome::Failure(60).is_retryable());
        assert!(!ResolutionOutcome::Failure(60).is_dead());
        assert!(ResolutionOutcome::Failure(6).is_dead());
        assert!(ResolutionOutcome::Failure(-22).is_dead());
        assert!(!ResolutionOutcome::Failure(22).is_dead());
        assert!(!ResolutionOutcome::Failure(22).is_retryable());
        assert!(!ResolutionOutcome::Resolved("https://x.example".into()).is_dead());
    }

    #[test]
    fn test_url_entry__trims_and_tracks_feeds() {
        let entry = UrlEntry::with_feeds(" https://example.com ", vec!["https://example.com/rss"]);

        assert_eq!(entry.url, "https://example.com");
        assert!(entry.has_feeds());
        assert!(!UrlEntry::new("https://example.com").has_feeds());
    }

    #[test]
    fn test_url_error__display() {
        let err = UrlError::new(
            "https://example.com",
            UrlErrorKind::Resolution,
            Some(6),
            "Bad URL",
        );

        assert_eq!(
            err.to_string(),
            "Error 6: 'Bad URL' for URL:\n\thttps://example.com"
        );
    }
}
