//! Per-attempt deadline with bounded linear-backoff retry.
//!
//! The tracker's search endpoint is intermittently slow under load. Each
//! attempt runs under a short deadline; when it expires the loop waits a
//! little longer each time (2 s, 3 s, 4 s, ...) and tries again, until the
//! [`TimeoutPolicy`] attempt budget is spent.
//!
//! Only deadline expiry is retried. Any error the operation itself returns
//! ends the loop immediately.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, warn};
use tracker::{Sleeper, TimeoutPolicy, TrackerError};

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Runs `attempt` under `policy`, retrying only when an attempt's deadline
/// expires.
///
/// For a budget of `R` attempts this makes at most `R - 1` retries; retry `k`
/// is preceded by a sleep of `k + 1` seconds. When attempt `R` also times out
/// the loop returns [`TrackerError::TimeoutExceeded`] without sleeping again.
///
/// A timed-out attempt is cancelled by dropping its future.
pub async fn timeout_and_retry<T, F, Fut, S>(
    operation: &'static str,
    policy: TimeoutPolicy,
    sleeper: &S,
    mut attempt: F,
) -> Result<T, TrackerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TrackerError>>,
    S: Sleeper + ?Sized,
{
    let mut count: u32 = 1;
    loop {
        match tokio::time::timeout(policy.per_attempt(), attempt()).await {
            Ok(result) => {
                debug!(operation, attempt = count, ok = result.is_ok(), "attempt finished");
                return result;
            }
            Err(_elapsed) => {
                count += 1;
                if count > policy.max_attempts() {
                    error!(
                        operation,
                        attempts = policy.max_attempts(),
                        per_attempt = ?policy.per_attempt(),
                        "attempt budget exhausted"
                    );
                    return Err(TrackerError::TimeoutExceeded {
                        operation,
                        per_attempt: policy.per_attempt(),
                        attempts: policy.max_attempts(),
                    });
                }

                let backoff = policy.backoff_before(count);
                warn!(
                    operation,
                    timed_out_attempt = count - 1,
                    next_attempt = count,
                    backoff = ?backoff,
                    "attempt timed out; backing off"
                );
                sleeper.sleep(backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Records requested sleeps without waiting.
    #[derive(Default)]
    struct RecordingSleeper {
        sleeps: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn seconds(&self) -> Vec<u64> {
            self.sleeps.lock().unwrap().iter().map(Duration::as_secs).collect()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    fn policy(max_attempts: u32) -> TimeoutPolicy {
        TimeoutPolicy::new(Duration::from_secs(5), max_attempts).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn every_attempt_timing_out_surfaces_timeout_after_budget() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = timeout_and_retry("search", policy(10), &sleeper, || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending()
        })
        .await;

        assert!(matches!(
            result,
            Err(TrackerError::TimeoutExceeded {
                operation: "search",
                attempts: 10,
                ..
            })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(sleeper.seconds(), vec![2, 3, 4, 5, 6, 7, 8, 9, 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_third_attempt_stops_retrying() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let result = timeout_and_retry("search", policy(10), &sleeper, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    std::future::pending::<()>().await;
                }
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.seconds(), vec![2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn operation_errors_are_not_retried() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = timeout_and_retry("search", policy(10), &sleeper, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TrackerError::collaborator("401 Unauthorized")) }
        })
        .await;

        assert!(matches!(result, Err(TrackerError::Collaborator(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.seconds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn error_after_timeouts_is_returned_as_is() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = timeout_and_retry("search", policy(10), &sleeper, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 1 {
                    std::future::pending::<()>().await;
                }
                Err(TrackerError::configuration("bad query"))
            }
        })
        .await;

        assert!(matches!(result, Err(TrackerError::Configuration { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sleeper.seconds(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn single_attempt_budget_never_sleeps() {
        let sleeper = RecordingSleeper::default();

        let result: Result<(), _> =
            timeout_and_retry("search", policy(1), &sleeper, std::future::pending).await;

        assert!(matches!(
            result,
            Err(TrackerError::TimeoutExceeded { attempts: 1, .. })
        ));
        assert!(sleeper.seconds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_finishing_inside_the_deadline_succeed() {
        let sleeper = RecordingSleeper::default();

        let result = timeout_and_retry("search", policy(3), &sleeper, || async {
            tokio::time::sleep(Duration::from_millis(4_900)).await;
            Ok("page")
        })
        .await;

        assert_eq!(result.unwrap(), "page");
        assert!(sleeper.seconds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_for_the_requested_duration() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(3)).await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
