//! Application-wide constants to avoid magic values throughout the codebase.
//!
//! This module centralizes the exit-code tables, tool flags and defaults
//! used across the application, making them easier to maintain and modify.

/// Output format constants
pub mod output_formats {
    /// Plain text: URL line followed by tab-indented feed lines
    pub const TXT: &str = "txt";
    /// Pretty-printed JSON object keyed by URL
    pub const JSON: &str = "json";
    /// PHP `serialize()` encoding of the same mapping
    pub const PHP: &str = "php";

    /// Default output format
    pub const DEFAULT: &str = TXT;

    /// All valid output formats
    pub const ALL: [&str; 3] = [TXT, JSON, PHP];
}

/// Exit codes reported by the probe tools, see <https://ec.haxx.se/usingcurl-returns.html>
pub mod exit_codes {
    /// Transient network, TLS and local I/O failures. A cached outcome with
    /// one of these codes is evicted and the URL probed again.
    pub const RETRYABLE: [i32; 20] = [
        4, 5, 16, 23, 26, 27, 33, 42, 43, 45, 48, 55, 59, 60, 61, 75, 76, 77, 78, 80,
    ];

    /// Failures that mark a URL as dead for the rest of the run.
    pub const DEAD: [i32; 9] = [3, 6, 7, 18, 28, 47, 52, 56, BROKEN_LINK];

    /// Synthetic code for a spider probe that reported a broken link
    pub const BROKEN_LINK: i32 = -22;

    /// curl: couldn't resolve host
    pub const COULD_NOT_RESOLVE_HOST: i32 = 6;

    /// curl: operation timed out
    pub const OPERATION_TIMED_OUT: i32 = 28;

    /// Reported when a process was terminated by a signal
    pub const TERMINATED_BY_SIGNAL: i32 = -1;

    pub fn is_retryable(code: i32) -> bool {
        RETRYABLE.contains(&code)
    }

    pub fn is_dead(code: i32) -> bool {
        DEAD.contains(&code)
    }
}

/// Phrases matched (case-insensitively) in the spider probe's diagnostics
pub mod spider_phrases {
    pub const BROKEN_LINK: &str = "broken link";
    pub const REMOTE_FILE_EXISTS: &str = "Remote file exists and could contain further links";
}

/// Timeout and duration constants
pub mod timeouts {
    /// Default connect timeout in seconds
    pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 3;
    /// Default total transfer time is this multiple of the connect timeout
    pub const MAX_TIME_MULTIPLIER: u64 = 10;
    /// Maximum reasonable timeout in seconds (24 hours)
    pub const MAX_TIMEOUT_SECONDS: u64 = 86400;
    /// Spider probe timeout in seconds
    pub const SPIDER_TIMEOUT_SECONDS: u64 = 5;
    /// Spider probe tries
    pub const SPIDER_TRIES: u32 = 2;
    /// Feed page download timeout in seconds
    pub const FEED_FETCH_TIMEOUT_SECONDS: u64 = 10;
}

/// Default configuration values
pub mod defaults {
    /// Bound on redirect-chain advances within one resolution
    pub const MAX_REDIRECT_ADVANCES: u32 = 10;
    /// Maximum configurable concurrency
    pub const MAX_CONCURRENCY: usize = 1000;
    /// Config file looked up in the current and parent directories
    pub const CONFIG_FILE_NAME: &str = ".feedex.toml";
    /// How many parent directories are searched for a config file
    pub const CONFIG_SEARCH_DEPTH: usize = 3;
    /// Largest page body the feed finder will read
    pub const MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;
}

/// Names of the external tools the resolver drives
pub mod tools {
    pub const CURL: &str = "curl";
    pub const WGET: &str = "wget";

    /// Requirement descriptions shown when a tool is missing
    pub const REQUIREMENTS: [(&str, &str); 2] = [
        (CURL, "tool: curl - https://curl.haxx.se"),
        (WGET, "tool: wget - https://www.gnu.org/software/wget/"),
    ];
}

/// Process exit codes of the feedex binary
pub mod process_exit {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const INTERRUPTED: i32 = 130;
}
