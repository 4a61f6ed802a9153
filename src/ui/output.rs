//! Output rendering and writing for feedex

use serde::Serialize;
use std::fmt::Write as _;

use crate::config::Config;
use crate::core::constants::output_formats;
use crate::core::error::Result;
use crate::core::types::{BatchResult, UrlError};
use crate::reporting::logging;

/// Render a batch result in the given format.
pub fn render(results: &BatchResult, format: &str) -> Result<String> {
    match format {
        output_formats::JSON => render_json(results),
        output_formats::PHP => Ok(render_php(results)),
        _ => Ok(render_txt(results)),
    }
}

/// A blank line and the URL per entry, then one tab-indented line per feed.
///
/// This is also the input file format, so output can be fed back in.
pub fn render_txt(results: &BatchResult) -> String {
    let mut out = String::new();
    for (url, feeds) in results {
        out.push('\n');
        out.push_str(url);
        out.push('\n');
        for feed in feeds.iter() {
            out.push('\t');
            out.push_str(feed);
            out.push('\n');
        }
    }
    out.trim().to_string()
}

pub fn render_json(results: &BatchResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// PHP `serialize()` encoding of the mapping. String lengths are in bytes.
pub fn render_php(results: &BatchResult) -> String {
    let mut out = String::new();
    let _ = write!(out, "a:{}:{{", results.len());
    for (url, feeds) in results {
        push_php_string(&mut out, url);
        let _ = write!(out, "a:{}:{{", feeds.len());
        for (i, feed) in feeds.iter().enumerate() {
            let _ = write!(out, "i:{i};");
            push_php_string(&mut out, feed);
        }
        out.push('}');
    }
    out.push('}');
    out
}

fn push_php_string(out: &mut String, value: &str) {
    let _ = write!(out, "s:{}:\"{}\";", value.len(), value);
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    errors: &'a [UrlError],
}

pub fn render_errors_json(errors: &[UrlError]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ErrorReport { errors })?)
}

/// Write the rendered result to the configured file and/or stdout.
///
/// Nothing is written for an empty result.
pub fn write_results(results: &BatchResult, config: &Config) -> Result<()> {
    if results.is_empty() {
        log::info!("No results to write");
        return Ok(());
    }

    let rendered = render(results, config.output_format())?;

    if let Some(ref path) = config.output_file {
        std::fs::write(path, &rendered)?;
        log::info!("Wrote {} URL(s) to {path}", results.len());
    }
    if config.echo.unwrap_or(false) {
        println!("{rendered}");
    }
    Ok(())
}

/// Report per-URL errors after the data.
///
/// JSON output gets a JSON error document on stdout; other formats log
/// each error as a warning.
pub fn report_errors(errors: &[UrlError], config: &Config) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    if config.output_format() == output_formats::JSON {
        println!("{}", render_errors_json(errors)?);
    } else {
        for err in errors {
            logging::log_url_error(err);
        }
    }
    Ok(())
}
