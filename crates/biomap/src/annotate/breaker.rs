//! Fault isolation for flaky annotation sources.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed { failures: u32 },
    Open { until: Instant },
    HalfOpen,
}

/// Skips calls to a source after repeated consecutive failures.
///
/// After `failure_threshold` consecutive failures the breaker opens and
/// [`allow`](Self::allow) returns false until `cooldown` has elapsed. The
/// next call is then let through as a trial: success closes the breaker,
/// failure opens it for another cooldown.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(name: impl Into<String>, failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            name: name.into(),
            failure_threshold: failure_threshold.max(1),
            cooldown,
            state: Mutex::new(BreakerState::Closed { failures: 0 }),
        }
    }

    /// Whether a call may be attempted now.
    pub fn allow(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Open { until } if Instant::now() < until => false,
            BreakerState::Open { .. } => {
                debug!("Circuit for {} is half-open, allowing a trial call", self.name);
                *state = BreakerState::HalfOpen;
                true
            }
            _ => true,
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        *self.state.lock() = BreakerState::Closed { failures: 0 };
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        let failures = match *state {
            BreakerState::Closed { failures } => failures + 1,
            BreakerState::HalfOpen => self.failure_threshold,
            BreakerState::Open { .. } => return,
        };

        if failures >= self.failure_threshold {
            warn!(
                "Circuit for {} opened after {} consecutive failures; skipping calls for {:?}",
                self.name, failures, self.cooldown
            );
            *state = BreakerState::Open {
                until: Instant::now() + self.cooldown,
            };
        } else {
            *state = BreakerState::Closed { failures };
        }
    }

    /// Whether the breaker is currently rejecting calls.
    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), BreakerState::Open { until } if Instant::now() < until)
    }
}
