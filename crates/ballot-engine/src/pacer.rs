use crate::LOG_TARGET;
use alloy_primitives::Address;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Minimum spacing between two blocks on the same account chain of the
/// reference testnet.
pub const DEFAULT_BLOCK_INTERVAL: Duration = Duration::from_secs(10);

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Tracks the last submission per account and how long the next one must wait.
#[derive(Debug, Clone)]
pub struct BlockPacer {
    interval: Duration,
    last_submission: BTreeMap<Address, Instant>,
}

impl BlockPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_submission: BTreeMap::new(),
        }
    }

    pub fn remaining(&self, account: Address, now: Instant) -> Duration {
        match self.last_submission.get(&account) {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(*last)),
            None => Duration::ZERO,
        }
    }

    pub fn record(&mut self, account: Address, at: Instant) {
        if self.interval.is_zero() {
            return;
        }
        self.last_submission.insert(account, at);
    }

    /// Sleeps until `account` may submit again and returns the time waited.
    pub fn wait(&self, account: Address, sleeper: &dyn Sleeper) -> Duration {
        let remaining = self.remaining(account, Instant::now());
        if !remaining.is_zero() {
            debug!(
                target: LOG_TARGET,
                %account,
                wait_ms = remaining.as_millis() as u64,
                "waiting for next block slot"
            );
            sleeper.sleep(remaining);
        }
        remaining
    }
}

impl Default for BlockPacer {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_INTERVAL)
    }
}

#[cfg(test)]
#[path = "pacer_test.rs"]
mod tests;
