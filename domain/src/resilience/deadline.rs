use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Bounds the total wall-clock time of a unit of work.
///
/// When the deadline fires first, the wrapped future is dropped at its current await
/// point. Nothing it would have done afterwards runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineGuard {
    timeout: Duration,
}

impl DeadlineGuard {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn run<F>(&self, task: F) -> Result<F::Output, DeadlineExceeded>
    where
        F: Future,
    {
        tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| DeadlineExceeded {
                timeout: self.timeout,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded {
    pub timeout: Duration,
}

impl fmt::Display for DeadlineExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timed out after {} ms", self.timeout.as_millis())
    }
}

impl StdError for DeadlineExceeded {}
