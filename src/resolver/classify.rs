use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::constants::spider_phrases;

/// URLs mentioned in spider diagnostics. The final character may not be a
/// dot so sentence punctuation is not swallowed.
static DIAGNOSTIC_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://\S+[^.\s]+").expect("diagnostic URL pattern is valid")
});

/// What the spider probe's diagnostics say about a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpiderOutcome {
    /// The spider reported a broken link
    BrokenLink,
    /// The spider confirmed the remote file exists
    RemoteExists,
    /// URLs found in the text, in order of first appearance
    Candidates(Vec<String>),
    /// Nothing recognisable
    Inconclusive,
}

/// Turns spider diagnostic text into a [`SpiderOutcome`].
pub trait SpiderClassifier: Send + Sync {
    fn classify(&self, diagnostics: &str) -> SpiderOutcome;
}

/// Classifier for `wget --spider -v` stderr output.
#[derive(Debug, Default, Clone)]
pub struct WgetSpiderClassifier {}

impl SpiderClassifier for WgetSpiderClassifier {
    fn classify(&self, diagnostics: &str) -> SpiderOutcome {
        let lowered = diagnostics.to_lowercase();

        if lowered.contains(&spider_phrases::BROKEN_LINK.to_lowercase()) {
            return SpiderOutcome::BrokenLink;
        }
        if lowered.contains(&spider_phrases::REMOTE_FILE_EXISTS.to_lowercase()) {
            return SpiderOutcome::RemoteExists;
        }

        let candidates = extract_urls(diagnostics);
        if candidates.is_empty() {
            SpiderOutcome::Inconclusive
        } else {
            SpiderOutcome::Candidates(candidates)
        }
    }
}

/// All URLs in `text`, deduplicated, in order of first appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in DIAGNOSTIC_URL_PATTERN.find_iter(text) {
        let url = m.as_str();
        if !found.iter().any(|seen| seen == url) {
            found.push(url.to_string());
        }
    }
    found
}
