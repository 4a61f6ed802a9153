// Command-line interface definitions and parsing for feedex

use crate::config::CliConfig;
use crate::core::constants::output_formats;
use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .multiple(true)
        .args(["url", "input"])
))]
pub struct Cli {
    // Input
    /// Single URL to process (used when the input file yields no URLs)
    #[arg(short = 'u', long, value_name = "URL", help_heading = "Input")]
    pub url: Option<String>,

    /// File with one URL per line; tab-indented lines list known feeds
    #[arg(short = 'i', long, value_name = "FILE", help_heading = "Input")]
    pub input: Option<String>,

    // Batch Policy
    /// Re-check URLs that already have feeds and re-probe failed URLs
    #[arg(long, help_heading = "Batch Policy")]
    pub force_check: bool,

    /// Drop URLs without feeds from the output
    #[arg(short = 'c', long, help_heading = "Batch Policy")]
    pub clear: bool,

    // Probe Options
    /// Connect timeout in seconds (default: 3)
    #[arg(short = 't', long, value_name = "SECONDS", help_heading = "Probe Options")]
    pub timeout: Option<u64>,

    /// Total time limit per probe in seconds (default: 10x timeout)
    #[arg(long, value_name = "SECONDS", help_heading = "Probe Options")]
    pub max_time: Option<u64>,

    /// URLs processed concurrently (default: CPU cores)
    #[arg(long, value_name = "COUNT", help_heading = "Probe Options")]
    pub concurrency: Option<usize>,

    // Output & Verbosity
    /// Output format
    #[arg(short = 'f', long, value_name = "FORMAT", value_parser = output_formats::ALL, help_heading = "Output & Verbosity")]
    pub format: Option<String>,

    /// Write the output to this file
    #[arg(long, value_name = "FILE", help_heading = "Output & Verbosity")]
    pub filename: Option<String>,

    /// Print the output to stdout
    #[arg(short = 'e', long, help_heading = "Output & Verbosity")]
    pub echo: bool,

    /// Suppress all logging
    #[arg(short = 'q', long, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Enable debug logging (implies --verbose)
    #[arg(short = 'd', long, help_heading = "Output & Verbosity")]
    pub debug: bool,

    /// Disable the progress bar
    #[arg(long, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,
}

/// Convert parsed arguments into the CLI layer of the configuration
pub fn cli_to_config(cli: &Cli) -> CliConfig {
    CliConfig {
        url: cli.url.as_ref().map(|url| url.trim().to_string()),
        input_file: cli.input.clone(),
        timeout: cli.timeout,
        max_time: cli.max_time,
        concurrency: cli.concurrency,
        force_check: cli.force_check,
        clear: cli.clear,
        output_format: cli.format.clone(),
        output_file: cli.filename.clone(),
        echo: cli.echo,
        quiet: cli.quiet,
        verbose: cli.verbose,
        debug: cli.debug,
        no_progress: cli.no_progress,
        config_file: cli.config.clone(),
        no_config: cli.no_config,
    }
}
