use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const BATCH_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.yellow/red}] {pos}/{len} URLs processed ({eta})";

/// Progress bar over the URLs of one batch. Disabled reporters do nothing.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            bar: enabled.then(|| ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())),
        }
    }

    pub fn disabled() -> Self {
        Self { bar: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.bar.is_some()
    }

    pub fn start_batch(&self, total_urls: usize) {
        let Some(pb) = &self.bar else {
            return;
        };

        pb.set_length(total_urls as u64);
        pb.set_position(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(BATCH_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("Resolving URLs");
        pb.enable_steady_tick(Duration::from_millis(120));
    }

    pub fn url_done(&self) {
        if let Some(pb) = &self.bar {
            pb.inc(1);
        }
    }

    pub fn finish_batch(&self, error_count: usize) {
        if let Some(pb) = &self.bar {
            let message = if error_count == 0 {
                "✓ All URLs processed".to_string()
            } else {
                format!("✓ Batch complete ({error_count} error(s))")
            };
            pb.finish_with_message(message);
        }
    }

    /// Remove the bar without a final message, used on interrupt
    pub fn abandon(&self) {
        if let Some(pb) = &self.bar {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_reporter_is_noop() {
        let reporter = ProgressReporter::new(false);
        assert!(!reporter.is_enabled());

        reporter.start_batch(10);
        reporter.url_done();
        reporter.finish_batch(0);
        reporter.abandon();
    }

    #[test]
    fn test_enabled_reporter_counts() {
        let reporter = ProgressReporter::new(true);
        assert!(reporter.is_enabled());

        reporter.start_batch(3);
        reporter.url_done();
        reporter.url_done();

        assert_eq!(reporter.bar.as_ref().map(|pb| pb.position()), Some(2));
        reporter.finish_batch(1);
    }
}
