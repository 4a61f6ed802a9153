//! Query-string adapter for serving a single lookup over HTTP.
//!
//! This runs the same batch entry point as the CLI, in-process. Hosting it
//! behind an HTTP server is left to the embedding application.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::batch::{BatchOrchestrator, BatchPolicy};
use crate::config::Config;
use crate::core::constants::output_formats;
use crate::core::error::{FeedexError, Result};
use crate::core::types::UrlEntry;
use crate::discovery::FeedFinder;
use crate::process::ProcessRunner;
use crate::ui::output;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Parameters accepted from a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub url: Option<String>,
    pub format: String,
    pub refresh: bool,
    pub echo: bool,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            url: None,
            format: output_formats::JSON.to_string(),
            refresh: false,
            echo: true,
        }
    }
}

impl QueryRequest {
    /// Parse a raw query string such as `url=https%3A%2F%2Fexample.com&refresh`.
    ///
    /// Keys are case-insensitive and unknown keys are dropped. Values are
    /// percent-decoded with markup and control characters removed. A flag
    /// given without a value counts as set.
    pub fn parse(query: &str) -> Self {
        let mut request = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let value = sanitize(&value);
            match key.to_ascii_lowercase().as_str() {
                "url" if !value.is_empty() => request.url = Some(value),
                "format" if output_formats::ALL.contains(&value.as_str()) => {
                    request.format = value
                }
                "refresh" => request.refresh = is_set(&value),
                "echo" => request.echo = is_set(&value),
                _ => {}
            }
        }

        request
    }

    /// Configuration for running this request
    pub fn to_config(&self, base: &Config) -> Config {
        Config {
            output_format: Some(self.format.clone()),
            force_check: Some(self.refresh || base.force_check.unwrap_or(false)),
            echo: Some(self.echo),
            output_file: None,
            ..base.clone()
        }
    }
}

fn sanitize(value: &str) -> String {
    TAG_PATTERN
        .replace_all(value, "")
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_set(value: &str) -> bool {
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Body and content type for a handled query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub content_type: &'static str,
    pub body: String,
}

/// Run one query through `orchestrator` and render the response body.
pub async fn handle_query<R, F>(
    orchestrator: &BatchOrchestrator<R, F>,
    base: &Config,
    query: &str,
) -> Result<QueryResponse>
where
    R: ProcessRunner,
    F: FeedFinder,
{
    let request = QueryRequest::parse(query);
    let url = request
        .url
        .clone()
        .ok_or_else(|| FeedexError::NoUrls("query string".to_string()))?;
    let config = request.to_config(base);
    log::info!("Query for {url} (format={}, refresh={})", request.format, request.refresh);

    let report = orchestrator
        .process_batch(vec![UrlEntry::new(url)], BatchPolicy::from_config(&config))
        .await?;

    let mut body = String::new();
    if request.echo && !report.results.is_empty() {
        body.push_str(&output::render(&report.results, &request.format)?);
    }
    if !report.errors.is_empty() {
        if request.format == output_formats::JSON {
            if !body.is_empty() {
                body.push('\n');
            }
            body.push_str(&output::render_errors_json(&report.errors)?);
        } else {
            output::report_errors(&report.errors, &config)?;
        }
    }

    Ok(QueryResponse {
        content_type: "application/json",
        body,
    })
}
