//! Bounded linear backoff with an explicit, cancellable timer.
//!
//! Retry `n` (1-indexed) waits `base_delay * n`; nothing is scheduled once
//! `max_retries` retries have been used. The worst-case wait is therefore
//! `base_delay * max_retries`.

use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::Sleep;

use crate::config::RealtimeSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_retries,
        }
    }

    pub fn from_config(cfg: &RealtimeSection) -> Self {
        Self::new(cfg.base_delay(), cfg.max_retries)
    }

    /// Delay before retry `attempt` (1-indexed); `None` past the budget.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        Some(self.base_delay * attempt)
    }
}

/// One pending wake-up. Re-arming replaces the previous deadline.
#[derive(Default)]
pub struct RetryTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl RetryTimer {
    pub fn arm(&mut self, delay: Duration) {
        self.sleep = Some(Box::pin(tokio::time::sleep(delay)));
    }

    /// Returns whether a pending timer was dropped.
    pub fn cancel(&mut self) -> bool {
        self.sleep.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    /// Resolves when the armed deadline passes; pending forever when disarmed.
    /// Cancel-safe: dropping the future keeps the deadline.
    pub async fn fired(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.sleep = None;
            }
            None => future::pending().await,
        }
    }
}

/// Retry counter and the timer for the next attempt.
pub struct RetryState {
    policy: RetryPolicy,
    count: u32,
    timer: RetryTimer,
}

impl RetryState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            count: 0,
            timer: RetryTimer::default(),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_armed()
    }

    /// Zero the counter and drop any pending retry.
    pub fn reset(&mut self) {
        self.count = 0;
        self.timer.cancel();
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    /// Arm the next retry. Returns `(attempt, delay)`, or `None` when the
    /// budget is spent.
    pub fn schedule(&mut self) -> Option<(u32, Duration)> {
        let attempt = self.count + 1;
        let Some(delay) = self.policy.delay_for(attempt) else {
            self.timer.cancel();
            return None;
        };
        self.count = attempt;
        self.timer.arm(delay);
        Some((attempt, delay))
    }

    pub async fn fired(&mut self) {
        self.timer.fired().await
    }
}
