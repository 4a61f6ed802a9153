use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::core::types::ResolutionOutcome;

type Slot = Arc<AsyncMutex<Option<ResolutionOutcome>>>;

/// Run-scoped memo of resolution outcomes keyed by input URL.
///
/// Each URL owns an async slot. A resolution holds its slot for the whole
/// probe sequence, so a concurrent lookup of the same URL waits and then
/// reuses the stored outcome instead of probing again.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    slots: Mutex<FxHashMap<String, Slot>>,
}

/// What a lookup decided about a cached outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheDecision {
    /// Return this outcome without probing
    Hit(ResolutionOutcome),
    /// Nothing usable is cached; probe the URL
    Miss,
}

impl CacheDecision {
    /// Apply the eviction policy to a stored outcome.
    ///
    /// Retryable codes are always re-probed. With `force`, every failure
    /// code is re-probed; a resolved URL is still reused.
    pub fn for_outcome(outcome: Option<&ResolutionOutcome>, force: bool) -> Self {
        match outcome {
            None => CacheDecision::Miss,
            Some(outcome) if outcome.is_retryable() => CacheDecision::Miss,
            Some(ResolutionOutcome::Failure(_)) if force => CacheDecision::Miss,
            Some(outcome) => CacheDecision::Hit(outcome.clone()),
        }
    }
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, url: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(None)))
            .clone()
    }

    /// Take exclusive access to the entry for `url`, waiting for any
    /// in-flight resolution of the same URL to finish.
    pub async fn lock(&self, url: &str) -> CacheEntry {
        CacheEntry {
            guard: self.slot(url).lock_owned().await,
        }
    }

    /// Read the outcome for `url` without waiting.
    ///
    /// Returns `None` when nothing is cached or the entry is being resolved
    /// right now, which keeps redirect chains that loop back onto each
    /// other from deadlocking. A caller that gets `None` for a busy entry
    /// probes that URL itself, so only input URLs are strictly serialized.
    pub fn peek(&self, url: &str) -> Option<ResolutionOutcome> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.get(url)?.clone()
        };
        slot.try_lock().ok().and_then(|outcome| outcome.clone())
    }

    /// Store an outcome, replacing what was there.
    pub async fn insert(&self, url: &str, outcome: ResolutionOutcome) {
        self.lock(url).await.store(outcome);
    }

    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .values()
            .filter(|slot| slot.try_lock().map(|o| o.is_some()).unwrap_or(true))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive handle on one cache entry.
pub struct CacheEntry {
    guard: OwnedMutexGuard<Option<ResolutionOutcome>>,
}

impl CacheEntry {
    pub fn get(&self) -> Option<&ResolutionOutcome> {
        self.guard.as_ref()
    }

    pub fn evict(&mut self) {
        *self.guard = None;
    }

    pub fn store(&mut self, outcome: ResolutionOutcome) {
        *self.guard = Some(outcome);
    }
}
