use crate::config::Config;
use crate::core::types::{ResolutionOutcome, UrlError};
use log::{debug, error, info, warn};

/// Pick the log level for the verbosity flags. Quiet wins over everything.
pub fn level_for(verbose: bool, debug: bool, quiet: bool) -> log::LevelFilter {
    if quiet {
        log::LevelFilter::Off
    } else if debug {
        log::LevelFilter::Debug
    } else if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    }
}

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, debug: bool, quiet: bool) {
    let level = level_for(verbose, debug, quiet);

    // `try_init` so embedding callers that already installed a logger keep it
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .try_init();

    debug!("Logger initialized with level: {level:?}");
}

/// Log configuration information
pub fn log_config_info(config: &Config, concurrency: usize) {
    info!(
        "Configuration: concurrency={concurrency}, timeout={}s, max_time={}s",
        config.timeout_secs(),
        config.max_time_secs()
    );
    info!(
        "Policy: force_check={}, clear={}, format={}",
        config.force_check.unwrap_or(false),
        config.clear.unwrap_or(false),
        config.output_format()
    );
}

/// Log batch start
pub fn log_batch_start(total: usize, pending: usize) {
    info!("Processing {pending} of {total} URL(s)");
}

/// Log batch completion
pub fn log_batch_complete(resolved: usize, errors: usize, duration_ms: u128) {
    if errors == 0 {
        info!("✅ Batch complete: {resolved} URL(s) with results ({duration_ms}ms)");
    } else {
        warn!(
            "❌ Batch complete: {resolved} URL(s) with results, {errors} error(s) ({duration_ms}ms)"
        );
    }
}

/// Log the outcome of one resolution
pub fn log_resolution(url: &str, outcome: &ResolutionOutcome) {
    match outcome {
        ResolutionOutcome::Resolved(target) if target == url => debug!("✓ {url}"),
        ResolutionOutcome::Resolved(target) => debug!("✓ {url} -> {target}"),
        ResolutionOutcome::Failure(code) => debug!("✗ {url} -> {code}"),
    }
}

/// Log a per-URL error from a batch
pub fn log_url_error(err: &UrlError) {
    warn!("{err}");
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}
