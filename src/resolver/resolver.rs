use crate::config::Config;
use crate::core::constants::{defaults, exit_codes, timeouts};
use crate::core::error::Result;
use crate::core::types::{ResolutionOutcome, is_numeric, parse_absolute_url};
use crate::process::{CommandSpec, ProcessOutput, ProcessRunner, ToolPaths};
use crate::reporting::logging;
use crate::resolver::cache::{CacheDecision, ResolutionCache};
use crate::resolver::classify::{SpiderClassifier, SpiderOutcome, WgetSpiderClassifier};

/// Per-call knobs for [`UrlResolver::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Connect timeout in seconds
    pub timeout: u64,
    /// Total time limit in seconds for one probe
    pub max_time: u64,
    /// Re-probe URLs whose cached outcome is any failure code
    pub force: bool,
    /// Redirect-chain advances allowed before giving up
    pub max_advances: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::with_timeout(timeouts::DEFAULT_CONNECT_TIMEOUT_SECONDS)
    }
}

impl ResolveOptions {
    pub fn with_timeout(timeout: u64) -> Self {
        Self {
            timeout,
            max_time: timeout * timeouts::MAX_TIME_MULTIPLIER,
            force: false,
            max_advances: defaults::MAX_REDIRECT_ADVANCES,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.timeout_secs(),
            max_time: config.max_time_secs(),
            force: config.force_check.unwrap_or(false),
            max_advances: config
                .max_redirect_advances
                .unwrap_or(defaults::MAX_REDIRECT_ADVANCES),
        }
    }

    pub fn forced(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Follows redirect chains with external tools and memoizes the outcome.
pub struct UrlResolver<R: ProcessRunner> {
    runner: R,
    tools: ToolPaths,
    cache: ResolutionCache,
    classifier: Box<dyn SpiderClassifier>,
}

/// Where a single probe round leaves the resolution.
enum Step {
    /// Restart with a new candidate; carries the status that led here
    Advance(String, i32),
    Done(ResolutionOutcome),
}

impl<R: ProcessRunner> UrlResolver<R> {
    pub fn new(runner: R, tools: ToolPaths) -> Self {
        Self {
            runner,
            tools,
            cache: ResolutionCache::new(),
            classifier: Box::new(WgetSpiderClassifier::default()),
        }
    }

    pub fn with_classifier<C: SpiderClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Resolve `url` to the end of its redirect chain, or to a failure code.
    ///
    /// The outcome is cached under `url` in this resolver's own cache.
    /// Malformed URLs are rejected before any tool runs, and a tool that
    /// cannot be started fails this URL only.
    pub async fn resolve(&self, url: &str, options: ResolveOptions) -> Result<ResolutionOutcome> {
        self.resolve_in(&self.cache, url, options).await
    }

    /// Like [`resolve`](Self::resolve), memoizing in `cache` instead.
    ///
    /// A batch passes a cache it created for that run, so nothing carries
    /// over between runs of the same resolver.
    pub async fn resolve_in(
        &self,
        cache: &ResolutionCache,
        url: &str,
        options: ResolveOptions,
    ) -> Result<ResolutionOutcome> {
        parse_absolute_url(url)?;

        let mut entry = cache.lock(url).await;
        match CacheDecision::for_outcome(entry.get(), options.force) {
            CacheDecision::Hit(outcome) => {
                log::debug!("Cached outcome for {url}: {outcome}");
                return Ok(outcome);
            }
            CacheDecision::Miss => entry.evict(),
        }

        let outcome = self.follow(cache, url, options).await?;
        logging::log_resolution(url, &outcome);
        entry.store(outcome.clone());
        Ok(outcome)
    }

    async fn follow(
        &self,
        cache: &ResolutionCache,
        url: &str,
        options: ResolveOptions,
    ) -> Result<ResolutionOutcome> {
        let mut current = url.to_string();
        let mut advances: u32 = 0;

        loop {
            if current != url
                && let CacheDecision::Hit(outcome) =
                    CacheDecision::for_outcome(cache.peek(&current).as_ref(), options.force)
            {
                log::debug!("Cached outcome for redirect target {current}: {outcome}");
                return Ok(outcome);
            }

            match self.probe_round(&current, options).await? {
                Step::Done(outcome) => return Ok(outcome),
                Step::Advance(next, _) if advances < options.max_advances => {
                    advances += 1;
                    log::debug!("Advancing {current} -> {next} ({advances})");
                    current = next;
                }
                Step::Advance(next, status) => {
                    log::warn!(
                        "Giving up on {url} after {advances} redirect advances (next: {next})"
                    );
                    return Ok(match status {
                        0 => ResolutionOutcome::Failure(exit_codes::BROKEN_LINK),
                        code => ResolutionOutcome::Failure(code),
                    });
                }
            }
        }
    }

    async fn probe_round(&self, current: &str, options: ResolveOptions) -> Result<Step> {
        let probe = self.runner.run(&self.redirect_probe(current, options)).await?;
        let target = probe.last_line().to_string();
        let mut status = probe.status;
        log::debug!("Redirect probe for {current}: '{target}' (exit {status})");

        // A failing probe may still report how far the chain got
        if status != 0 && is_usable_target(&target) && target != current {
            return Ok(Step::Advance(target, status));
        }

        if target == current {
            let spider = self.runner.run(&self.spider_probe(current)).await?;
            if let Some(step) = self.read_spider(current, &target, status, &spider) {
                return Ok(step);
            }
        }

        if is_usable_target(&target)
            && (status == 0 || status == exit_codes::COULD_NOT_RESOLVE_HOST)
        {
            let check = self.runner.run(&self.status_probe(&target, options)).await?;
            log::debug!(
                "HTTP status for {target}: {} (exit {})",
                check.last_line(),
                check.status
            );
            status = check.status;
        }

        Ok(Step::Done(classify(target, status)))
    }

    fn read_spider(
        &self,
        current: &str,
        target: &str,
        status: i32,
        spider: &ProcessOutput,
    ) -> Option<Step> {
        if !spider.stdout.trim().is_empty() || spider.stderr.trim().is_empty() {
            return None;
        }

        match self.classifier.classify(&spider.stderr) {
            SpiderOutcome::BrokenLink => Some(Step::Done(ResolutionOutcome::Failure(
                exit_codes::BROKEN_LINK,
            ))),
            SpiderOutcome::RemoteExists => {
                Some(Step::Done(ResolutionOutcome::Resolved(target.to_string())))
            }
            SpiderOutcome::Candidates(candidates) => candidates
                .into_iter()
                .find(|candidate| candidate != current && parse_absolute_url(candidate).is_ok())
                .map(|candidate| Step::Advance(candidate, status)),
            SpiderOutcome::Inconclusive => None,
        }
    }

    fn redirect_probe(&self, url: &str, options: ResolveOptions) -> CommandSpec {
        self.curl(options)
            .args(["-I", "-i", "-Ls", "-w", "%{url_effective}", "-o", "/dev/null"])
            .arg(url)
    }

    fn status_probe(&self, url: &str, options: ResolveOptions) -> CommandSpec {
        self.curl(options)
            .args(["-s", "-o", "/dev/null", "-w", "%{http_code}"])
            .arg(url)
    }

    fn spider_probe(&self, url: &str) -> CommandSpec {
        CommandSpec::new(&self.tools.wget)
            .arg("--user-agent=")
            .arg("-t")
            .arg(timeouts::SPIDER_TRIES.to_string())
            .arg("-T")
            .arg(timeouts::SPIDER_TIMEOUT_SECONDS.to_string())
            .args(["-v", "--spider"])
            .arg(url)
    }

    fn curl(&self, options: ResolveOptions) -> CommandSpec {
        CommandSpec::new(&self.tools.curl)
            .arg("--connect-timeout")
            .arg(options.timeout.to_string())
            .arg("--max-time")
            .arg(options.max_time.to_string())
            .args(["--ciphers", "ALL", "-k"])
    }
}

/// Tools sometimes print a bare status code where a URL belongs.
fn is_usable_target(target: &str) -> bool {
    !target.is_empty() && !is_numeric(target)
}

fn classify(target: String, status: i32) -> ResolutionOutcome {
    match status {
        0 if is_usable_target(&target) => ResolutionOutcome::Resolved(target),
        0 => ResolutionOutcome::Failure(exit_codes::BROKEN_LINK),
        code => ResolutionOutcome::Failure(code),
    }
}
