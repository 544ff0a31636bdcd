//! Bounded retries and overall deadlines for calls into external collaborators.
//!
//! The two pieces are independent: [`BackoffRetryExecutor`] knows nothing about
//! wall-clock budgets and [`DeadlineGuard`] knows nothing about attempts. Callers
//! compose them, wrapping the whole retry sequence in a single deadline.

mod deadline;
mod retry;

pub use deadline::{DeadlineExceeded, DeadlineGuard};
pub use retry::{AttemptOutcome, BackoffRetryExecutor, RetryAttempt, RetryError, RetryPolicy};
