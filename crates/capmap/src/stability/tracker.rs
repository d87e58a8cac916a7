//! Per-endpoint backlog history.

use std::collections::{BTreeMap, VecDeque};

/// Sliding windows of "seconds until drain" readings, one per endpoint of
/// each health source.
///
/// Lives for a whole run; `reset` clears it before observing a fresh
/// deployment.
#[derive(Clone, Debug)]
pub struct StabilityTracker {
    window: usize,
    histories: Vec<BTreeMap<String, VecDeque<i64>>>,
}

impl StabilityTracker {
    pub fn new(sources: usize, window: usize) -> Self {
        Self {
            window: window.max(1),
            histories: vec![BTreeMap::new(); sources],
        }
    }

    pub fn reset(&mut self) {
        for h in &mut self.histories {
            h.clear();
        }
    }

    /// Append a reading, dropping the oldest one past the window size.
    pub fn record(&mut self, source: usize, endpoint: &str, drain_secs: i64) {
        let hist = self.histories[source]
            .entry(endpoint.to_string())
            .or_default();
        hist.push_back(drain_secs);
        while hist.len() > self.window {
            hist.pop_front();
        }
    }

    /// Forget an endpoint whose backlog buffer is gone.
    pub fn clear(&mut self, source: usize, endpoint: &str) {
        self.histories[source].remove(endpoint);
    }

    pub fn history(&self, source: usize, endpoint: &str) -> Option<&VecDeque<i64>> {
        self.histories.get(source)?.get(endpoint)
    }

    /// No backlog grew: for every endpoint the latest reading is not above the
    /// oldest one kept.
    pub fn is_healthy(&self) -> bool {
        self.histories.iter().flat_map(|h| h.values()).all(|hist| {
            match (hist.front(), hist.back()) {
                (Some(oldest), Some(latest)) => latest <= oldest,
                _ => true,
            }
        })
    }

    /// Largest latest reading across endpoints, if any backlog exists.
    pub fn worst_latest(&self) -> Option<i64> {
        self.histories
            .iter()
            .flat_map(|h| h.values())
            .filter_map(|hist| hist.back().copied())
            .max()
    }

    pub fn endpoint_count(&self) -> usize {
        self.histories.iter().map(BTreeMap::len).sum()
    }
}
