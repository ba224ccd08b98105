use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::MaraError;

/// Bounded retry with a backoff sleep before each retry. The attempt counter
/// is local to one `run` call, so every chunk starts with a fresh budget.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: fn(u32) -> Duration,
}

/// Default schedule: the i-th retry is preceded by an i-minute sleep, so the
/// first attempt runs immediately and the final one waits 19 minutes.
pub fn minute_backoff(retry: u32) -> Duration {
    Duration::from_secs(u64::from(retry) * 60)
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            backoff: minute_backoff,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: fn(u32) -> Duration) -> Self {
        assert!(max_attempts > 0, "retry policy needs at least one attempt");
        Self {
            max_attempts,
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `op` until it succeeds or the attempt budget is spent, returning
    /// the last error wrapped as `RetryExhausted`.
    pub fn run<T, F>(&self, mut op: F) -> Result<T, MaraError>
    where
        F: FnMut() -> Result<T, MaraError>,
    {
        let mut last = None;
        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                thread::sleep((self.backoff)(attempt));
            }
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(
                        "connection problem: {err}, retry {}/{}",
                        attempt + 1,
                        self.max_attempts
                    );
                    last = Some(err);
                }
            }
        }
        Err(MaraError::RetryExhausted {
            attempts: self.max_attempts,
            last: last.map(|err| err.to_string()).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use assert_matches::assert_matches;

    use super::*;

    fn no_backoff(_retry: u32) -> Duration {
        Duration::ZERO
    }

    #[test]
    fn returns_first_success() {
        let policy = RetryPolicy::new(5, no_backoff);
        let calls = AtomicU32::new(0);
        let result: Result<u32, MaraError> = policy.run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recovers_after_transient_failures() {
        let policy = RetryPolicy::new(5, no_backoff);
        let calls = AtomicU32::new(0);
        let result = policy.run(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(MaraError::UploadHttp("connection reset".to_string()))
            } else {
                Ok(())
            }
        });
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let policy = RetryPolicy::new(20, no_backoff);
        let calls = AtomicU32::new(0);
        let result: Result<(), MaraError> = policy.run(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(MaraError::UploadHttp("down".to_string()))
        });
        assert_eq!(calls.load(Ordering::SeqCst), 20);
        assert_matches!(result.unwrap_err(), MaraError::RetryExhausted { attempts: 20, .. });
    }

    #[test]
    fn minute_backoff_is_non_decreasing() {
        let mut previous = Duration::ZERO;
        for retry in 1..20 {
            let delay = minute_backoff(retry);
            assert!(delay >= previous);
            previous = delay;
        }
        assert_eq!(minute_backoff(19), Duration::from_secs(19 * 60));
    }
}
