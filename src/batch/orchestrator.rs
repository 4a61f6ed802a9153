use futures::stream::{self, StreamExt};
use rand::seq::SliceRandom;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::constants::exit_codes;
use crate::core::error::{FeedexError, Result};
use crate::core::types::{
    BatchResult, FeedSet, ResolutionOutcome, UrlEntry, UrlError, UrlErrorKind, parse_absolute_url,
};
use crate::discovery::FeedFinder;
use crate::process::ProcessRunner;
use crate::reporting::logging;
use crate::resolver::{ResolutionCache, ResolveOptions, UrlResolver};
use crate::ui::ProgressReporter;

/// How a batch treats prior data and failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Re-resolve URLs that already carry feeds, and re-probe cached failures
    pub force_check: bool,
    /// Drop URLs without feeds from the result instead of keeping them empty
    pub clear: bool,
}

impl BatchPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            force_check: config.force_check.unwrap_or(false),
            clear: config.clear.unwrap_or(false),
        }
    }
}

/// Result mapping plus the per-URL errors collected while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub results: BatchResult,
    pub errors: Vec<UrlError>,
}

/// What processing one entry produced, merged by [`BatchReport::absorb`].
#[derive(Debug)]
struct EntryOutcome {
    /// Key and feeds to record, if the entry stays in the result
    record: Option<(String, FeedSet)>,
    error: Option<UrlError>,
}

impl BatchReport {
    fn absorb(&mut self, outcome: EntryOutcome, policy: BatchPolicy) {
        if let Some((key, feeds)) = outcome.record {
            if !(policy.clear && feeds.is_empty()) {
                self.results.entry(key).or_default().merge(feeds);
            }
        }
        if let Some(error) = outcome.error {
            self.errors.push(error);
        }
    }
}

/// Drives a batch of URLs through resolution and feed discovery.
pub struct BatchOrchestrator<R: ProcessRunner, F: FeedFinder> {
    resolver: UrlResolver<R>,
    finder: F,
    options: ResolveOptions,
    concurrency: usize,
    cancel: CancellationToken,
    progress: ProgressReporter,
}

impl<R: ProcessRunner, F: FeedFinder> BatchOrchestrator<R, F> {
    pub fn new(resolver: UrlResolver<R>, finder: F) -> Self {
        Self {
            resolver,
            finder,
            options: ResolveOptions::default(),
            concurrency: num_cpus::get(),
            cancel: CancellationToken::new(),
            progress: ProgressReporter::disabled(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Stop the batch when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn resolver(&self) -> &UrlResolver<R> {
        &self.resolver
    }

    /// Resolve every entry and discover feeds for the ones that resolve.
    ///
    /// Entries are visited in random order, at most `concurrency` at a time.
    /// Per-URL failures land in [`BatchReport::errors`]; only cancellation
    /// fails the batch, and then nothing is returned.
    pub async fn process_batch(
        &self,
        mut entries: Vec<UrlEntry>,
        policy: BatchPolicy,
    ) -> Result<BatchReport> {
        let started = Instant::now();
        entries.shuffle(&mut rand::thread_rng());

        let pending = entries
            .iter()
            .filter(|entry| policy.force_check || !entry.has_feeds())
            .count();
        logging::log_batch_start(entries.len(), pending);
        self.progress.start_batch(entries.len());

        // Outcomes are memoized for this run only
        let cache = ResolutionCache::new();
        let cache = &cache;
        let options = self.options.forced(policy.force_check || self.options.force);
        let work = stream::iter(entries)
            .map(|entry| async move {
                let outcome = self.process_entry(cache, entry, policy, options).await;
                self.progress.url_done();
                outcome
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>();

        // Dropping `work` drops in-flight probes, which kills their processes
        let outcomes = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.progress.abandon();
                log::warn!("Batch cancelled, discarding partial results");
                return Err(FeedexError::Cancelled);
            }
            outcomes = work => outcomes,
        };

        let mut report = BatchReport::default();
        for outcome in outcomes {
            report.absorb(outcome, policy);
        }

        self.progress.finish_batch(report.errors.len());
        logging::log_batch_complete(
            report.results.len(),
            report.errors.len(),
            started.elapsed().as_millis(),
        );
        Ok(report)
    }

    async fn process_entry(
        &self,
        cache: &ResolutionCache,
        entry: UrlEntry,
        policy: BatchPolicy,
        options: ResolveOptions,
    ) -> EntryOutcome {
        if entry.has_feeds() && !policy.force_check {
            log::debug!("Keeping {} known feed(s) for {}", entry.feeds.len(), entry.url);
            return EntryOutcome {
                record: Some((entry.url, entry.feeds)),
                error: None,
            };
        }

        if let Err(err) = parse_absolute_url(&entry.url) {
            return EntryOutcome {
                record: None,
                error: Some(UrlError::new(
                    entry.url,
                    UrlErrorKind::MalformedUrl,
                    None,
                    err.to_string(),
                )),
            };
        }

        // Failed URLs stay under their input key with no feeds
        let failed = |error: UrlError| EntryOutcome {
            record: Some((entry.url.clone(), FeedSet::default())),
            error: Some(error),
        };

        let target = match self.resolver.resolve_in(cache, &entry.url, options).await {
            Ok(outcome) => match outcome.resolved_url() {
                Some(target) => target.to_string(),
                None => {
                    let code = match outcome {
                        ResolutionOutcome::Failure(code) => code,
                        ResolutionOutcome::Resolved(_) => exit_codes::BROKEN_LINK,
                    };
                    return failed(UrlError::new(
                        &entry.url,
                        UrlErrorKind::Resolution,
                        Some(code.into()),
                        describe_failure(code),
                    ));
                }
            },
            Err(err @ FeedexError::Spawn { .. }) => {
                return failed(UrlError::new(
                    &entry.url,
                    UrlErrorKind::Spawn,
                    None,
                    err.to_string(),
                ));
            }
            Err(err) => {
                return failed(UrlError::new(
                    &entry.url,
                    UrlErrorKind::Resolution,
                    None,
                    err.to_string(),
                ));
            }
        };

        if target != entry.url {
            log::info!("{} redirects to {target}", entry.url);
        }

        match self.finder.find_feeds(&target).await {
            Ok(feeds) => EntryOutcome {
                record: Some((target, feeds.into_iter().collect())),
                error: None,
            },
            Err(err) => {
                let (code, message) = match err {
                    FeedexError::Discovery { code, message } => (Some(code.into()), message),
                    other => (None, other.to_string()),
                };
                EntryOutcome {
                    record: Some((target.clone(), FeedSet::default())),
                    error: Some(UrlError::new(target, UrlErrorKind::Discovery, code, message)),
                }
            }
        }
    }
}

/// Human-readable text for a resolution failure code.
pub fn describe_failure(code: i32) -> String {
    let text = match code {
        exit_codes::BROKEN_LINK => "Broken link",
        3 => "URL malformed",
        exit_codes::COULD_NOT_RESOLVE_HOST => "Could not resolve host",
        7 => "Failed to connect to host",
        18 => "Partial file",
        exit_codes::OPERATION_TIMED_OUT => "Operation timed out",
        47 => "Too many redirects",
        52 => "Server returned nothing",
        56 => "Failure receiving network data",
        60 => "Peer certificate cannot be authenticated",
        _ if exit_codes::is_retryable(code) => "Transient failure",
        _ => "Resolution failed",
    };
    text.to_string()
}
