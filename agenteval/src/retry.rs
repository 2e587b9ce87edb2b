//! Retry/backoff policy shared by [`crate::dispatcher`] and [`crate::judge`].
//!
//! Grounded in the teacher's `graph::retry::RetryPolicy` (exponential
//! backoff capped at a max interval); generalized here to the engine's
//! single `RETRY_MAX_ATTEMPTS`/`RETRY_BASE_DELAY_SECS`/`RETRY_MAX_DELAY_SECS`
//! configuration (spec §4.2, §4.3 "rate limit handling").

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Which collaborator issued a retried call, so a drained
/// [`RetrySink`] can be turned into a readable status-history message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetrySource {
    Agent,
    Judge,
}

/// One rate-limit retry, as observed inside
/// [`crate::dispatcher::AgentClient::dispatch`] or
/// [`crate::judge::JudgeClient::complete`].
#[derive(Clone, Copy, Debug)]
pub struct RetryEvent {
    pub attempt: u32,
    pub wait_seconds: f64,
    pub source: RetrySource,
}

/// Collects retry events as they happen so
/// [`crate::evaluator::TestCaseEvaluator`] can surface them to the run's
/// status history afterwards — the transport layers record into it but
/// never see an `EvaluationRun`.
#[derive(Clone, Default)]
pub struct RetrySink(Arc<Mutex<Vec<RetryEvent>>>);

impl RetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, attempt: u32, wait_seconds: f64, source: RetrySource) {
        self.0.lock().unwrap().push(RetryEvent { attempt, wait_seconds, source });
    }

    /// Takes every event recorded so far, leaving the sink empty.
    pub fn drain(&self) -> Vec<RetryEvent> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_secs: f64, max_delay_secs: f64) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::from_secs_f64(base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs_f64(max_delay_secs.max(0.0)),
            multiplier: 2.0,
        }
    }

    /// `attempt` is 0-based (the first retry after the initial try is `0`).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Exponential delay for the given attempt, capped at `max_delay`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }
}

impl From<&crate::config::EngineConfig> for RetryPolicy {
    fn from(cfg: &crate::config::EngineConfig) -> Self {
        RetryPolicy::new(cfg.retry_max_attempts, cfg.retry_base_delay_secs, cfg.retry_max_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_exponentially_then_caps() {
        let policy = RetryPolicy::new(5, 1.0, 10.0);
        assert_eq!(policy.delay(0), Duration::from_secs_f64(1.0));
        assert_eq!(policy.delay(1), Duration::from_secs_f64(2.0));
        assert_eq!(policy.delay(2), Duration::from_secs_f64(4.0));
        assert_eq!(policy.delay(10), Duration::from_secs_f64(10.0));
    }

    #[test]
    fn should_retry_respects_max_attempts() {
        let policy = RetryPolicy::new(3, 1.0, 10.0);
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }
}
