use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::config::Config;
use crate::core::constants::{defaults, timeouts};
use crate::core::error::{FeedexError, Result};

/// MIME types that mark a `<link>` or `<a>` target as a feed
const FEED_MIME_TYPES: &[&str] = &[
    "application/rss+xml",
    "application/atom+xml",
    "application/rdf+xml",
    "application/feed+json",
    "application/x.atom+xml",
    "application/x-atom+xml",
    "text/rss+xml",
];

static FEED_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(?:link|a)\b[^>]*>").expect("feed tag pattern is valid"));

static ATTRIBUTE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)([a-z][a-z0-9_:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern is valid")
});

/// Finds the syndication feeds advertised by a page.
#[async_trait]
pub trait FeedFinder: Send + Sync {
    /// Fetch `url` and return the feed URLs it advertises.
    async fn find_feeds(&self, url: &str) -> Result<Vec<String>>;

    /// Feeds in an already downloaded document served from `url`.
    fn find_feeds_in(&self, url: &str, body: &[u8]) -> Result<Vec<String>> {
        Ok(feeds_in_document(url, body))
    }
}

/// Feed finder backed by an HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFeedFinder {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpFeedFinder {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(
                defaults::MAX_REDIRECT_ADVANCES as usize,
            ))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            max_bytes: defaults::MAX_PAGE_BYTES,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = config
            .timeout_secs()
            .max(timeouts::FEED_FETCH_TIMEOUT_SECONDS);
        Self::new(Duration::from_secs(timeout))
    }

    /// Cap on the downloaded page size
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    async fn read_capped(&self, url: &str, mut response: reqwest::Response) -> Result<Vec<u8>> {
        if let Some(len) = response.content_length()
            && len as usize > self.max_bytes
        {
            return Err(too_large(url, self.max_bytes));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| transport_error(url, err))?
        {
            if body.len().saturating_add(chunk.len()) > self.max_bytes {
                return Err(too_large(url, self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl FeedFinder for HttpFeedFinder {
    async fn find_feeds(&self, url: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| transport_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedexError::Discovery {
                code: status.as_u16(),
                message: format!("HTTP {status} fetching {url}"),
            });
        }

        // Relative links resolve against wherever the page actually lives
        let page_url = response.url().to_string();
        let body = self.read_capped(url, response).await?;
        let feeds = self.find_feeds_in(&page_url, &body)?;
        log::debug!("Found {} feed(s) on {page_url}", feeds.len());
        Ok(feeds)
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> FeedexError {
    FeedexError::Discovery {
        code: err.status().map(|s| s.as_u16()).unwrap_or(0),
        message: format!("{err} ({url})"),
    }
}

fn too_large(url: &str, max_bytes: usize) -> FeedexError {
    FeedexError::Discovery {
        code: 0,
        message: format!("response from {url} exceeds {max_bytes} bytes"),
    }
}

/// Feeds advertised by a downloaded document.
///
/// A document that is itself a feed yields its own URL. Otherwise every
/// `<link>` or `<a>` tag with `rel="alternate"` and a feed MIME type
/// contributes its `href`, resolved against `page_url`.
pub fn feeds_in_document(page_url: &str, body: &[u8]) -> Vec<String> {
    if feed_rs::parser::parse(body).is_ok() {
        return vec![page_url.to_string()];
    }
    scan_feed_links(&String::from_utf8_lossy(body), page_url)
}

/// Feed links declared in HTML, in document order without repeats.
pub fn scan_feed_links(html: &str, page_url: &str) -> Vec<String> {
    let base = url::Url::parse(page_url).ok();
    let mut feeds: Vec<String> = Vec::new();

    for tag in FEED_TAG_PATTERN.find_iter(html) {
        let mut rel = None;
        let mut mime = None;
        let mut href = None;

        for attr in ATTRIBUTE_PATTERN.captures_iter(tag.as_str()) {
            let value = attr
                .get(2)
                .or_else(|| attr.get(3))
                .or_else(|| attr.get(4))
                .map(|m| m.as_str().trim())
                .unwrap_or("");
            match attr[1].to_ascii_lowercase().as_str() {
                "rel" => rel = Some(value),
                "type" => mime = Some(value),
                "href" => href = Some(value),
                _ => {}
            }
        }

        let is_alternate = rel.is_some_and(|rel| {
            rel.split_whitespace()
                .any(|token| token.eq_ignore_ascii_case("alternate"))
        });
        let is_feed_type = mime.is_some_and(|mime| {
            let mime = mime.split(';').next().unwrap_or("").trim();
            FEED_MIME_TYPES
                .iter()
                .any(|feed_type| mime.eq_ignore_ascii_case(feed_type))
        });

        if !(is_alternate && is_feed_type) {
            continue;
        }
        if let Some(feed) = href.and_then(|href| resolve_href(base.as_ref(), href))
            && !feeds.contains(&feed)
        {
            feeds.push(feed);
        }
    }

    feeds
}

fn resolve_href(base: Option<&url::Url>, href: &str) -> Option<String> {
    let href = href.replace("&amp;", "&");
    if href.is_empty() {
        return None;
    }

    let resolved = match base {
        Some(base) => base.join(&href).ok()?,
        None => url::Url::parse(&href).ok()?,
    };
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
