use clap::Parser;
use feedex::batch::{BatchOrchestrator, BatchPolicy};
use feedex::config::{CliConfig, Config};
use feedex::core::constants::process_exit;
use feedex::core::{FeedexError, UrlEntry};
use feedex::discovery::{HttpFeedFinder, read_input_file};
use feedex::process::{SystemRunner, ToolPaths};
use feedex::reporting::logging;
use feedex::resolver::{ResolveOptions, UrlResolver};
use feedex::ui::{Cli, ProgressReporter, cli_to_config, output};

use std::io::IsTerminal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run_feedex_logic(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(FeedexError::Cancelled) => {
            eprintln!("Interrupted");
            std::process::exit(process_exit::INTERRUPTED);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(process_exit::FAILURE);
        }
    }
}

/// Main batch logic extracted from main() for testing
pub async fn run_feedex_logic(cli: &Cli) -> feedex::Result<i32> {
    let cli_config = cli_to_config(cli);

    let config = load_and_merge_config(&cli_config)?;
    logging::init_logger(
        config.verbose.unwrap_or(false),
        config.debug.unwrap_or(false),
        cli_config.quiet,
    );

    // Global preconditions, checked before any resolution work
    let tools = ToolPaths::locate(&config)?;
    let entries = collect_entries(&cli_config)?;
    logging::log_config_info(&config, config.concurrency());

    let cancel = CancellationToken::new();
    watch_for_interrupt(cancel.clone());

    let resolver = UrlResolver::new(SystemRunner::default(), tools);
    let orchestrator = BatchOrchestrator::new(resolver, HttpFeedFinder::from_config(&config)?)
        .with_options(ResolveOptions::from_config(&config))
        .with_concurrency(config.concurrency())
        .with_cancellation(cancel)
        .with_progress(create_progress_reporter(&cli_config));

    let report = orchestrator
        .process_batch(entries, BatchPolicy::from_config(&config))
        .await?;

    output::write_results(&report.results, &config)?;
    output::report_errors(&report.errors, &config)?;

    if config.output_file.is_none() && !config.echo.unwrap_or(false) {
        log::warn!("Results were not written anywhere; use --echo or --filename");
    }

    Ok(process_exit::SUCCESS)
}

/// Load configuration from file and merge with CLI arguments
pub fn load_and_merge_config(cli_config: &CliConfig) -> feedex::Result<Config> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(
                &format!("Could not load config file '{config_file}'"),
                Some(e),
            );
        })?
    } else {
        Config::load_from_standard_locations()
    };

    // Merge CLI arguments with configuration (CLI takes precedence)
    config.merge_with_cli(cli_config);
    config.validate()?;
    Ok(config)
}

/// Entries from the input file, falling back to the single `--url`
pub fn collect_entries(cli_config: &CliConfig) -> feedex::Result<Vec<UrlEntry>> {
    if let Some(ref input) = cli_config.input_file {
        match read_input_file(input) {
            Ok(entries) => return Ok(entries),
            Err(FeedexError::NoUrls(_)) if cli_config.url.is_some() => {
                log::info!("No URLs in {input}, using --url");
            }
            Err(e) => return Err(e),
        }
    }

    match cli_config.url {
        Some(ref url) if !url.is_empty() => Ok(vec![UrlEntry::new(url.as_str())]),
        _ => Err(FeedexError::NoUrls("command line".to_string())),
    }
}

fn create_progress_reporter(cli_config: &CliConfig) -> ProgressReporter {
    let enabled = !cli_config.quiet && !cli_config.no_progress && std::io::stderr().is_terminal();
    ProgressReporter::new(enabled)
}

fn watch_for_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, stopping");
            cancel.cancel();
        }
    });
}
