use std::time::Duration;

use crate::app::CalibrError;
use crate::config::{BackoffKind, RetryConfig};

/// Delay schedule between two attempts of the same task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately
    None,
    Fixed(Duration),
    /// `initial * 2^(retry - 1)`, capped at `max`
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Delay before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial, max } => {
                let factor = 2u32.saturating_pow(retry.saturating_sub(1));
                initial.saturating_mul(factor).min(max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    GiveUp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed per task; `None` never gives up
    pub max_attempts: Option<u32>,
    pub backoff: Backoff,
    /// Treat HTTP 404 as "no data for this date" and stop
    pub stop_on_not_found: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::forever()
    }
}

impl RetryPolicy {
    /// Retry every failure immediately, without limit.
    pub fn forever() -> Self {
        Self {
            max_attempts: None,
            backoff: Backoff::None,
            stop_on_not_found: false,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn stop_on_not_found(mut self, stop: bool) -> Self {
        self.stop_on_not_found = stop;
        self
    }

    /// Decide what happens after attempt number `attempt` failed with `error`.
    pub fn decide(&self, attempt: u32, error: &CalibrError) -> RetryDecision {
        if self.stop_on_not_found && error.is_not_found() {
            return RetryDecision::GiveUp;
        }
        if let Some(max) = self.max_attempts {
            if attempt >= max {
                return RetryDecision::GiveUp;
            }
        }
        RetryDecision::Retry(self.backoff.delay(attempt))
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        let delay = Duration::from_millis(config.delay_ms);
        let backoff = match config.backoff {
            _ if delay.is_zero() => Backoff::None,
            BackoffKind::Fixed => Backoff::Fixed(delay),
            BackoffKind::Exponential => Backoff::Exponential {
                initial: delay,
                max: Duration::from_millis(config.max_delay_ms).max(delay),
            },
        };

        Self {
            max_attempts: (config.max_attempts > 0).then_some(config.max_attempts),
            backoff,
            stop_on_not_found: config.stop_on_not_found,
        }
    }
}
