//! Executor settings.

use std::time::Duration;

/// Default pause between transactions.
pub const DEFAULT_THINK_TIME: Duration = Duration::from_millis(10);

/// Bounded retry with linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per transaction, including the first.
    pub max_attempts: u32,
    /// Sleep after failed attempt `n` is `n * backoff_step`.
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(1),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Length of the measurement window.
    pub duration: Duration,
    pub think_time: Duration,
    /// Halt on the first transaction that exhausts its retries.
    pub stop_on_error: bool,
    /// Keep a per-attempt timing trace.
    pub record_detail: bool,
    pub retry: RetryPolicy,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(60),
            think_time: DEFAULT_THINK_TIME,
            stop_on_error: false,
            record_detail: false,
            retry: RetryPolicy::default(),
        }
    }
}

impl ExecutorConfig {
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff(1), Duration::from_millis(1));
        assert_eq!(policy.backoff(2), Duration::from_millis(2));
    }
}
