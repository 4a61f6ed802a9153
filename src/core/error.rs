use std::fmt;

/// Comprehensive error types for feedex operations
#[derive(Debug)]
pub enum FeedexError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// URL without a parseable host
    InvalidUrl(String),

    /// An external command could not be started
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Required command-line tools are not installed
    MissingTool(Vec<String>),

    /// HTTP client error
    Http(reqwest::Error),

    /// Regex compilation error
    Regex(regex::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// JSON encoding error
    Json(serde_json::Error),

    /// Feed discovery failed for a page
    Discovery { code: u16, message: String },

    /// Input produced no URLs to check
    NoUrls(String),

    /// The run was interrupted before it finished
    Cancelled,
}

impl fmt::Display for FeedexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedexError::Io(err) => write!(f, "IO error: {err}"),
            FeedexError::Config(msg) => write!(f, "Configuration error: {msg}"),
            FeedexError::InvalidUrl(url) => write!(f, "Invalid URL: {url}"),
            FeedexError::Spawn { command, source } => {
                write!(f, "Spawn error: could not start '{command}': {source}")
            }
            FeedexError::MissingTool(missing) => {
                write!(f, "Missing requirement: {}", missing.join(", "))
            }
            FeedexError::Http(err) => write!(f, "HTTP error: {err}"),
            FeedexError::Regex(err) => write!(f, "Regex error: {err}"),
            FeedexError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            FeedexError::Json(err) => write!(f, "JSON error: {err}"),
            FeedexError::Discovery { code, message } => {
                write!(f, "Discovery error {code}: {message}")
            }
            FeedexError::NoUrls(source) => write!(f, "No URLs found: {source}"),
            FeedexError::Cancelled => write!(f, "Cancelled: run interrupted"),
        }
    }
}

impl std::error::Error for FeedexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedexError::Io(err) => Some(err),
            FeedexError::Spawn { source, .. } => Some(source),
            FeedexError::Http(err) => Some(err),
            FeedexError::Regex(err) => Some(err),
            FeedexError::TomlParsing(err) => Some(err),
            FeedexError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FeedexError {
    fn from(err: std::io::Error) -> Self {
        FeedexError::Io(err)
    }
}

impl From<reqwest::Error> for FeedexError {
    fn from(err: reqwest::Error) -> Self {
        FeedexError::Http(err)
    }
}

impl From<regex::Error> for FeedexError {
    fn from(err: regex::Error) -> Self {
        FeedexError::Regex(err)
    }
}

impl From<toml::de::Error> for FeedexError {
    fn from(err: toml::de::Error) -> Self {
        FeedexError::TomlParsing(err)
    }
}

impl From<serde_json::Error> for FeedexError {
    fn from(err: serde_json::Error) -> Self {
        FeedexError::Json(err)
    }
}

/// Type alias for Results using FeedexError
pub type Result<T> = std::result::Result<T, FeedexError>;
