//! Test utilities: mock implementations of the process and discovery traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability so tests can assert on recorded
//! calls after handing a clone to the code under test.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::core::error::{FeedexError, Result};
use crate::discovery::FeedFinder;
use crate::process::{CommandSpec, ProcessOutput, ProcessRunner};

// ---------------------------------------------------------------------------
// MockRunner
// ---------------------------------------------------------------------------

/// Which probe a command is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Redirect,
    Status,
    Spider,
}

impl Probe {
    fn of(command: &CommandSpec) -> Self {
        let program = command.program.to_string_lossy();
        if program.ends_with("wget") {
            Probe::Spider
        } else if command.args.iter().any(|arg| arg == "%{http_code}") {
            Probe::Status
        } else {
            Probe::Redirect
        }
    }
}

#[derive(Default)]
struct RunnerState {
    scripts: HashMap<(Probe, String), VecDeque<ProcessOutput>>,
    calls: Vec<(Probe, String)>,
    spawn_fails: bool,
}

/// Runner that replays scripted outputs per probe and target URL.
///
/// Each call pops the next output for its `(probe, url)`. When nothing is
/// scripted a status probe answers `200` with exit 0, and the other probes
/// fail with a spawn error so missing scripts are loud.
#[derive(Clone, Default)]
pub struct MockRunner {
    state: Arc<Mutex<RunnerState>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, probe: Probe, url: &str, output: ProcessOutput) -> Self {
        self.state
            .lock()
            .unwrap()
            .scripts
            .entry((probe, url.to_string()))
            .or_default()
            .push_back(output);
        self
    }

    /// Every command fails to start
    pub fn failing_spawn(self) -> Self {
        self.state.lock().unwrap().spawn_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<(Probe, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, probe: Probe) -> usize {
        self.calls().iter().filter(|(p, _)| *p == probe).count()
    }
}

#[async_trait]
impl ProcessRunner for MockRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessOutput> {
        let probe = Probe::of(command);
        let url = command.target().unwrap_or_default().to_string();
        let mut state = self.state.lock().unwrap();
        state.calls.push((probe, url.clone()));

        if state.spawn_fails {
            return Err(spawn_error(command));
        }
        match state
            .scripts
            .get_mut(&(probe, url))
            .and_then(VecDeque::pop_front)
        {
            Some(output) => Ok(output),
            None if probe == Probe::Status => Ok(ProcessOutput::new("200", "", 0)),
            None => Err(spawn_error(command)),
        }
    }
}

fn spawn_error(command: &CommandSpec) -> FeedexError {
    FeedexError::Spawn {
        command: command.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "unscripted command"),
    }
}

// ---------------------------------------------------------------------------
// MockFeedFinder
// ---------------------------------------------------------------------------

/// Feed finder answering from a fixed table of page URL to feeds.
///
/// Unknown pages have no feeds.
#[derive(Clone, Default)]
pub struct MockFeedFinder {
    pages: Arc<Mutex<HashMap<String, std::result::Result<Vec<String>, (u16, String)>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFeedFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feeds(self, url: &str, feeds: &[&str]) -> Self {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            Ok(feeds.iter().map(|f| f.to_string()).collect()),
        );
        self
    }

    pub fn with_error(self, url: &str, code: u16, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Err((code, message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedFinder for MockFeedFinder {
    async fn find_feeds(&self, url: &str) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(Ok(feeds)) => Ok(feeds.clone()),
            Some(Err((code, message))) => Err(FeedexError::Discovery {
                code: *code,
                message: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}
