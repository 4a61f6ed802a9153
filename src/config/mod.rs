//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::constants::{defaults, output_formats, timeouts};
use crate::core::error::{FeedexError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Connect timeout in seconds passed to the probe tools
    pub timeout: Option<u64>,

    /// Total time limit in seconds for one probe (defaults to timeout * 10)
    pub max_time: Option<u64>,

    /// Number of URLs resolved concurrently
    pub concurrency: Option<usize>,

    /// Upper bound on redirect-chain advances within one resolution
    pub max_redirect_advances: Option<u32>,

    /// Output format (txt, json, php)
    pub output_format: Option<String>,

    /// File the result is written to
    pub output_file: Option<String>,

    /// Re-check URLs that already have feeds in the input
    pub force_check: Option<bool>,

    /// Drop URLs without feeds from the result
    pub clear: Option<bool>,

    /// Print the result to stdout
    pub echo: Option<bool>,

    /// Enable verbose logging
    pub verbose: Option<bool>,

    /// Enable debug logging (implies verbose)
    pub debug: Option<bool>,

    /// Explicit path to curl instead of a PATH lookup
    pub curl_path: Option<String>,

    /// Explicit path to wget instead of a PATH lookup
    pub wget_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Some(timeouts::DEFAULT_CONNECT_TIMEOUT_SECONDS),
            max_time: None,    // Derived from timeout
            concurrency: None, // Will default to CPU core count
            max_redirect_advances: Some(defaults::MAX_REDIRECT_ADVANCES),
            output_format: Some(output_formats::DEFAULT.to_string()),
            output_file: None,
            force_check: Some(false),
            clear: Some(false),
            echo: Some(false),
            verbose: Some(false),
            debug: Some(false),
            curl_path: None,
            wget_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FeedexError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            FeedexError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        Self::load_from_dir(Path::new("."))
    }

    /// Look for a config file in `dir` and up to three of its parents
    pub fn load_from_dir(dir: &Path) -> Self {
        let mut candidate: PathBuf = dir.to_path_buf();
        for _ in 0..=defaults::CONFIG_SEARCH_DEPTH {
            if let Ok(config) = Self::load_from_file(candidate.join(defaults::CONFIG_FILE_NAME)) {
                return config;
            }
            candidate = candidate.join("..");
        }

        Self::default()
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Probe timing
        if let Some(timeout) = cli_config.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(max_time) = cli_config.max_time {
            self.max_time = Some(max_time);
        }
        if let Some(concurrency) = cli_config.concurrency {
            self.concurrency = Some(concurrency);
        }

        // Batch policy
        if cli_config.force_check {
            self.force_check = Some(true);
        }
        if cli_config.clear {
            self.clear = Some(true);
        }

        // Output & format
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
        if let Some(ref output_file) = cli_config.output_file {
            self.output_file = Some(output_file.clone());
        }
        if cli_config.echo {
            self.echo = Some(true);
        }
        if cli_config.verbose {
            self.verbose = Some(true);
        }
        if cli_config.debug {
            self.debug = Some(true);
            self.verbose = Some(true);
        }
    }

    /// Connect timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs())
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout
            .unwrap_or(timeouts::DEFAULT_CONNECT_TIMEOUT_SECONDS)
    }

    /// Total probe time limit; ten times the connect timeout unless set
    pub fn max_time_secs(&self) -> u64 {
        self.max_time
            .unwrap_or_else(|| self.timeout_secs() * timeouts::MAX_TIME_MULTIPLIER)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or_else(num_cpus::get)
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(output_formats::DEFAULT)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(FeedexError::Config(
                    "Timeout cannot be 0. Expected a positive integer representing seconds."
                        .to_string(),
                ));
            }
            if timeout > timeouts::MAX_TIMEOUT_SECONDS {
                return Err(FeedexError::Config(format!(
                    "Timeout of {timeout} seconds is extremely large (>24 hours). Consider using a smaller value."
                )));
            }
        }

        if let Some(0) = self.max_time {
            return Err(FeedexError::Config(
                "Max time cannot be 0. Expected a positive integer representing seconds."
                    .to_string(),
            ));
        }

        if let Some(concurrency) = self.concurrency {
            if concurrency == 0 {
                return Err(FeedexError::Config(
                    "Concurrency cannot be 0. Expected a positive integer.".to_string(),
                ));
            }
            if concurrency > defaults::MAX_CONCURRENCY {
                return Err(FeedexError::Config(format!(
                    "Concurrency of {concurrency} is extremely high and may cause system instability. Consider using a smaller value."
                )));
            }
        }

        if let Some(0) = self.max_redirect_advances {
            return Err(FeedexError::Config(
                "Max redirect advances cannot be 0.".to_string(),
            ));
        }

        if let Some(ref format) = self.output_format
            && !output_formats::ALL.contains(&format.as_str())
        {
            return Err(FeedexError::Config(format!(
                "Invalid output format '{format}'. Expected one of: {}.",
                output_formats::ALL.join(", ")
            )));
        }

        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Input
    pub url: Option<String>,        // --url
    pub input_file: Option<String>, // --input

    // Probe timing
    pub timeout: Option<u64>,       // --timeout
    pub max_time: Option<u64>,      // --max-time
    pub concurrency: Option<usize>, // --concurrency

    // Batch policy
    pub force_check: bool, // --force-check
    pub clear: bool,       // --clear

    // Output & format
    pub output_format: Option<String>, // --format
    pub output_file: Option<String>,   // --filename
    pub echo: bool,                    // --echo
    pub quiet: bool,                   // --quiet
    pub verbose: bool,                 // --verbose
    pub debug: bool,                   // --debug
    pub no_progress: bool,             // --no-progress

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
