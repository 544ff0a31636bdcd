//! Backoff retry for idempotent operations.

use log::*;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// How many times to run an operation and how long to wait between runs.
///
/// `delays[i]` is slept before attempt `i + 2`. A schedule shorter than the number of
/// retries reuses its last delay; an empty schedule retries immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delays: Vec<Duration>,
}

impl RetryPolicy {
    /// `max_attempts` counts the first attempt; zero is treated as one.
    pub fn new(max_attempts: u32, delays: Vec<Duration>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delays,
        }
    }

    /// Doubling schedule starting at `base`, capped at `max_delay`.
    pub fn exponential(max_attempts: u32, base: Duration, max_delay: Duration) -> Self {
        let delays = (0..max_attempts.saturating_sub(1))
            .map(|retry| {
                base.checked_mul(1_u32 << retry.min(31))
                    .unwrap_or(max_delay)
                    .min(max_delay)
            })
            .collect();
        Self::new(max_attempts, delays)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Delay slept before `attempt` (1-based). The first attempt never waits.
    pub fn delay_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let index = (attempt - 2) as usize;
        self.delays
            .get(index)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            3,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    TransientFailure(String),
}

/// One run of the operation within a single executor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAttempt {
    pub attempt_number: u32,
    /// Time slept before this attempt started
    pub delay: Duration,
    pub outcome: AttemptOutcome,
}

/// Every attempt failed. Carries the last error and the per-attempt history.
#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last_error: E,
    pub history: Vec<RetryAttempt>,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up after {} attempt(s): {}",
            self.attempts, self.last_error
        )
    }
}

impl<E> StdError for RetryError<E>
where
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.last_error)
    }
}

/// Runs an operation until it succeeds or the policy's attempts are used up.
///
/// Every `Err` returned by the operation is treated as transient and retried, so
/// operations must only fail on conditions worth retrying. A successful "nothing found"
/// answer is final.
#[derive(Debug, Clone, Default)]
pub struct BackoffRetryExecutor {
    policy: RetryPolicy,
}

impl BackoffRetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Runs `operation`, sleeping between failed attempts per the policy.
    ///
    /// `context` prefixes every log line, so callers put their correlation id in it.
    pub async fn run<T, E, F, Fut>(&self, context: &str, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.policy.max_attempts();
        let mut history = Vec::with_capacity(max_attempts as usize);
        let mut attempt = 1;
        let mut delay = Duration::ZERO;

        loop {
            match operation().await {
                Ok(value) => {
                    history.push(RetryAttempt {
                        attempt_number: attempt,
                        delay,
                        outcome: AttemptOutcome::Success,
                    });
                    if attempt > 1 {
                        info!("{context}: succeeded on attempt {attempt}/{max_attempts}");
                        trace!("{context}: attempts {history:?}");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    history.push(RetryAttempt {
                        attempt_number: attempt,
                        delay,
                        outcome: AttemptOutcome::TransientFailure(err.to_string()),
                    });

                    if attempt >= max_attempts {
                        warn!("{context}: attempt {attempt}/{max_attempts} failed, giving up: {err}");
                        return Err(RetryError {
                            attempts: attempt,
                            last_error: err,
                            history,
                        });
                    }

                    attempt += 1;
                    delay = self.policy.delay_before_attempt(attempt);
                    warn!(
                        "{context}: attempt {}/{max_attempts} failed, retrying in {}ms: {err}",
                        attempt - 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
