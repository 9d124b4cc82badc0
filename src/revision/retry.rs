//! Bounded automatic retry around the end-to-end revision operation.

use std::time::Duration;

use super::error::RevisionError;
use super::service::{ProgressObserver, RevisionProgress};

/// Default number of attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// Blocks the current thread between attempts.
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    /// Pauses for `duration`.
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Attempt limit and fixed backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; at least one attempt is always made.
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Attempt limit, including the first attempt.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }
}

/// Value produced by a run together with the attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T> {
    /// Successful result.
    pub value: T,
    /// Attempts made, including the successful one.
    pub attempts: u32,
}

/// Runs an operation up to the policy's attempt limit.
#[derive(Debug, Clone, Default)]
pub struct RetryController {
    policy: RetryPolicy,
    attempts: u32,
}

impl RetryController {
    /// Creates a controller for `policy`.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Attempts recorded by the current run; zero once a run has finished.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs `operation` until it succeeds, fails permanently, or the attempt
    /// limit is reached.
    ///
    /// Before each retry a [`RevisionProgress::RetryScheduled`] event is sent
    /// to `observer` and `sleeper` pauses for the backoff.
    ///
    /// # Errors
    ///
    /// Non-retryable errors are returned unchanged after the first failure.
    /// When every attempt fails with a retryable error the last one is
    /// wrapped in [`RevisionError::RetriesExhausted`].
    pub fn run<T, F>(
        &mut self,
        sleeper: &dyn Sleeper,
        observer: &mut dyn ProgressObserver,
        mut operation: F,
    ) -> Result<Attempted<T>, RevisionError>
    where
        F: FnMut(&mut dyn ProgressObserver) -> Result<T, RevisionError>,
    {
        self.attempts = 0;
        loop {
            self.attempts = self.attempts.saturating_add(1);
            let attempt = self.attempts;

            let error = match operation(&mut *observer) {
                Ok(value) => {
                    self.attempts = 0;
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    });
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                self.attempts = 0;
                return Err(error);
            }

            if attempt >= self.policy.max_attempts {
                self.attempts = 0;
                tracing::warn!(attempts = attempt, %error, "revision attempts exhausted");
                return Err(RevisionError::RetriesExhausted {
                    attempts: attempt,
                    last_error: Box::new(error),
                    backup_hint: String::new(),
                });
            }

            let next_attempt = attempt.saturating_add(1);
            tracing::info!(
                attempt = next_attempt,
                max_attempts = self.policy.max_attempts,
                %error,
                "retrying revision"
            );
            observer.observe(&RevisionProgress::RetryScheduled {
                attempt: next_attempt,
                max_attempts: self.policy.max_attempts,
                delay: self.policy.backoff,
                reason: error.to_string(),
            });
            sleeper.sleep(self.policy.backoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use rstest::{fixture, rstest};

    use super::{RetryController, RetryPolicy};
    use crate::revision::test_support::RecordingSleeper;
    use crate::revision::{RevisionError, RevisionProgress, SilentProgress};

    #[fixture]
    fn controller() -> RetryController {
        RetryController::new(RetryPolicy::default())
    }

    fn network_error() -> RevisionError {
        RevisionError::Network {
            message: "connection reset".to_owned(),
        }
    }

    #[rstest]
    fn succeeds_on_third_attempt_and_resets_counter(mut controller: RetryController) {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0_u32);
        let mut events = Vec::new();
        let mut observer = |event: &RevisionProgress| events.push(event.clone());

        let outcome = controller
            .run(&sleeper, &mut observer, |_| {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(network_error())
                } else {
                    Ok(format!("attempt {}", calls.get()))
                }
            })
            .expect("third attempt succeeds");

        assert_eq!(outcome.value, "attempt 3");
        assert_eq!(outcome.attempts, 3);
        assert_eq!(controller.attempts(), 0);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(2); 2]);

        let scheduled: Vec<u32> = events
            .iter()
            .filter_map(|event| match event {
                RevisionProgress::RetryScheduled {
                    attempt,
                    max_attempts: 3,
                    ..
                } => Some(*attempt),
                _ => None,
            })
            .collect();
        assert_eq!(scheduled, vec![2, 3]);
    }

    #[rstest]
    fn exhaustion_wraps_the_last_error(mut controller: RetryController) {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0_u32);

        let result: Result<_, _> = controller.run(&sleeper, &mut SilentProgress, |_| {
            calls.set(calls.get() + 1);
            Err::<(), _>(RevisionError::Server {
                status: 503,
                message: format!("overloaded {}", calls.get()),
            })
        });

        let error = result.expect_err("every attempt fails");
        let RevisionError::RetriesExhausted {
            attempts,
            last_error,
            ..
        } = error
        else {
            panic!("expected exhaustion");
        };
        assert_eq!(attempts, 3);
        assert_eq!(calls.get(), 3);
        assert!(last_error.to_string().contains("overloaded 3"));
        assert_eq!(sleeper.recorded().len(), 2);
        assert_eq!(controller.attempts(), 0);
    }

    #[rstest]
    #[case::validation(RevisionError::validation("Please enter some text"))]
    #[case::configuration(RevisionError::configuration("missing key"))]
    fn permanent_errors_surface_immediately(
        mut controller: RetryController,
        #[case] permanent: RevisionError,
    ) {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0_u32);

        let result = controller.run(&sleeper, &mut SilentProgress, |_| {
            calls.set(calls.get() + 1);
            Err::<(), _>(permanent.clone())
        });

        assert_eq!(result, Err(permanent));
        assert_eq!(calls.get(), 1);
        assert!(sleeper.recorded().is_empty());
    }

    #[test]
    fn policy_always_allows_one_attempt() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }
}
