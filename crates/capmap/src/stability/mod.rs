//! Stability check: is the deployed configuration keeping up with its load?
//!
//! Model
//! - Up to three components (engine, broker, rrd broker) publish a JSON
//!   document per endpoint. An endpoint with an enabled queue file has a
//!   backlog; its reading is the projected drain time in seconds.
//! - A sample is healthy when no backlog grew over the kept window and the
//!   worst backlog drains within `settle_drain_secs`.
//! - `is_stable` polls until `confirmations` consecutive healthy samples were
//!   seen, or the timeout budget runs out. A single healthy sample is never
//!   enough on its own unless `confirmations == 1`.
//! - Unreadable documents make the sample unhealthy; they are not errors.

mod source;
mod tracker;

pub use source::{backlog_readings, FileHealthSource, HealthSource};
pub use tracker::StabilityTracker;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

/// Wall clock used for drain computations and polling.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now(&self) -> i64;
    fn sleep(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StabilityCfg {
    /// Budget for one `is_stable` call.
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Readings kept per endpoint.
    pub window: usize,
    /// Consecutive healthy samples required.
    pub confirmations: u32,
    /// Largest acceptable projected drain time.
    pub settle_drain_secs: i64,
}

impl Default for StabilityCfg {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(500),
            poll_interval: Duration::from_secs(10),
            window: 20,
            confirmations: 3,
            settle_drain_secs: 10,
        }
    }
}

/// Outcome of reading every source once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sample {
    Healthy,
    /// Backlogs not growing but some still too long to drain.
    Draining { worst: i64 },
    Growing,
    Unreadable,
}

/// Polls health sources and keeps their history.
pub struct StabilityCheck<C: Clock = SystemClock> {
    sources: Vec<Box<dyn HealthSource>>,
    tracker: StabilityTracker,
    clock: C,
    cfg: StabilityCfg,
}

impl<C: Clock> StabilityCheck<C> {
    pub fn new(sources: Vec<Box<dyn HealthSource>>, cfg: StabilityCfg, clock: C) -> Self {
        let tracker = StabilityTracker::new(sources.len(), cfg.window);
        Self {
            sources,
            tracker,
            clock,
            cfg,
        }
    }

    pub fn cfg(&self) -> &StabilityCfg {
        &self.cfg
    }

    pub fn tracker(&self) -> &StabilityTracker {
        &self.tracker
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Forget all history (new deployment).
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Read every source once and fold the readings into the history.
    pub fn sample(&mut self) -> Sample {
        let now = self.clock.now();
        let mut readable = true;
        for (idx, src) in self.sources.iter_mut().enumerate() {
            let readings = src
                .read()
                .and_then(|doc| backlog_readings(src.name(), &doc, now));
            match readings {
                Ok(readings) => {
                    for (endpoint, drain) in readings {
                        match drain {
                            Some(secs) => {
                                debug!(source = src.name(), %endpoint, drain_secs = secs, "backlog");
                                self.tracker.record(idx, &endpoint, secs);
                            }
                            None => self.tracker.clear(idx, &endpoint),
                        }
                    }
                }
                Err(e) => {
                    warn!(source = src.name(), error = %e, "health source unreadable");
                    readable = false;
                }
            }
        }
        if !readable {
            return Sample::Unreadable;
        }
        if !self.tracker.is_healthy() {
            return Sample::Growing;
        }
        match self.tracker.worst_latest() {
            Some(worst) if worst > self.cfg.settle_drain_secs => Sample::Draining { worst },
            _ => Sample::Healthy,
        }
    }

    /// Poll until the system is confirmed healthy or `timeout` elapses.
    pub fn is_stable(&mut self, timeout: Duration) -> bool {
        let deadline = self.clock.now() + timeout.as_secs() as i64;
        let mut streak = 0u32;
        loop {
            let sample = self.sample();
            if sample == Sample::Healthy {
                streak += 1;
            } else {
                streak = 0;
            }
            if streak >= self.cfg.confirmations.max(1) {
                info!(samples = streak, "stable");
                return true;
            }
            if self.clock.now() >= deadline {
                info!(last = ?sample, "not stable before timeout");
                return false;
            }
            self.clock.sleep(self.cfg.poll_interval);
        }
    }

    /// `is_stable` with the configured budget.
    pub fn wait_stable(&mut self) -> bool {
        let timeout = self.cfg.timeout;
        self.is_stable(timeout)
    }
}
