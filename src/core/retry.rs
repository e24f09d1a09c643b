//! Transient-failure retry policy for quote requests.
//!
//! Mirrors the upstream policy: at most three attempts with a uniformly
//! random 1-10 s pause between them, retrying on transient errors and on
//! empty responses. When all attempts produce an empty response the empty
//! result is returned rather than an error; validation failures abort
//! immediately.

use retry::delay::Range;
use retry::{OperationResult, retry};

use crate::utils::error::{Error, Result};

/// Outcome classification used while attempts are in flight.
enum Attempt {
    Empty,
    Failed(Error),
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    attempts: usize,
    wait_min_ms: u64,
    wait_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            wait_min_ms: 1_000,
            wait_max_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: usize, wait_min_ms: u64, wait_max_ms: u64) -> Self {
        Self {
            attempts: attempts.max(1),
            wait_min_ms,
            wait_max_ms,
        }
    }

    /// Run `op` under the policy. An empty result is retried and, after the
    /// last attempt, returned as-is.
    pub fn run<T, F>(&self, mut op: F) -> Result<Vec<T>>
    where
        F: FnMut() -> Result<Vec<T>>,
    {
        let delays = Range::from_millis_inclusive(self.wait_min_ms, self.wait_max_ms)
            .take(self.attempts.saturating_sub(1));

        let outcome = retry(delays, || match op() {
            Ok(rows) if rows.is_empty() => {
                log::warn!("empty response from server, retrying");
                OperationResult::Retry(Attempt::Empty)
            }
            Ok(rows) => OperationResult::Ok(rows),
            Err(err) if err.is_transient() => {
                log::warn!("request failed, retrying: {}", err);
                OperationResult::Retry(Attempt::Failed(err))
            }
            Err(err) => OperationResult::Err(Attempt::Failed(err)),
        });

        match outcome {
            Ok(rows) => Ok(rows),
            Err(exhausted) => match exhausted.error {
                Attempt::Empty => Ok(Vec::new()),
                Attempt::Failed(err) => Err(err),
            },
        }
    }

    /// Run a scalar `op` under the policy. Any successful value is final;
    /// only transient errors are retried.
    pub fn run_value<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let delays = Range::from_millis_inclusive(self.wait_min_ms, self.wait_max_ms)
            .take(self.attempts.saturating_sub(1));

        let outcome = retry(delays, || match op() {
            Ok(value) => OperationResult::Ok(value),
            Err(err) if err.is_transient() => {
                log::warn!("request failed, retrying: {}", err);
                OperationResult::Retry(err)
            }
            Err(err) => OperationResult::Err(err),
        });

        outcome.map_err(|exhausted| exhausted.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, 1, 2)
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = fast_policy().run(|| {
            calls += 1;
            if calls < 3 {
                Err(Error::Protocol("connection reset".into()))
            } else {
                Ok(vec![1, 2, 3])
            }
        });

        assert_eq!(result.unwrap(), vec![1, 2, 3]);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_empty_result_returned_after_exhaustion() {
        let mut calls = 0;
        let result: Result<Vec<u8>> = fast_policy().run(|| {
            calls += 1;
            Ok(Vec::new())
        });

        assert_eq!(result.unwrap(), Vec::<u8>::new());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_validation_error_aborts_immediately() {
        let mut calls = 0;
        let result: Result<Vec<u8>> = fast_policy().run(|| {
            calls += 1;
            Err(Error::Validation("bad market".into()))
        });

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_scalar_succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = fast_policy().run_value(|| {
            calls += 1;
            if calls < 3 {
                Err(Error::Protocol("connection reset".into()))
            } else {
                Ok(42u32)
            }
        });

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_scalar_validation_error_aborts_immediately() {
        let mut calls = 0;
        let result: Result<u32> = fast_policy().run_value(|| {
            calls += 1;
            Err(Error::Validation("bad market".into()))
        });

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_transient_error_surfaces_after_exhaustion() {
        let mut calls = 0;
        let result: Result<Vec<u8>> = fast_policy().run(|| {
            calls += 1;
            Err(Error::Protocol("timeout".into()))
        });

        assert!(matches!(result, Err(Error::Protocol(_))));
        assert_eq!(calls, 3);
    }
}
