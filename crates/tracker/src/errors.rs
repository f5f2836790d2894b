//! Error and timeout-policy types for the issue tracker query domain.
//!
//! [`TrackerError`] covers every failure a gateway call or an issue projection
//! can surface. Collaborator failures are carried through untouched as the
//! error source so callers can still downcast to the transport's own type.
//!
//! [`TimeoutPolicy`] describes the per-attempt deadline and attempt budget
//! applied by the gateway's retry loop.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Timeout semantics
// ---------------------------------------------------------------------------

/// Per-attempt deadline used by plain `search` calls.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-attempt deadline used by `search_issues` calls.
pub const SEARCH_ISSUES_TIMEOUT: Duration = Duration::from_secs(60);

/// Number of attempts made before a timeout is surfaced to the caller.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// How long a single attempt may run and how many attempts a call may make.
///
/// Only timeouts consume the attempt budget. Between attempts the gateway
/// sleeps for `n` seconds, where `n` is the number of the attempt about to
/// start (2, 3, 4, ...).
///
/// Only [`TimeoutPolicy::new`] and the named defaults build one, so a
/// policy always has at least one attempt and a non-zero deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    per_attempt: Duration,
    max_attempts: u32,
}

impl TimeoutPolicy {
    /// Creates a policy, returning `None` if `max_attempts` is zero or the
    /// per-attempt deadline is zero.
    #[must_use]
    pub fn new(per_attempt: Duration, max_attempts: u32) -> Option<Self> {
        if max_attempts == 0 || per_attempt.is_zero() {
            None
        } else {
            Some(Self {
                per_attempt,
                max_attempts,
            })
        }
    }

    /// Policy applied to raw `search` calls: 5 s per attempt, 10 attempts.
    pub fn search() -> Self {
        Self {
            per_attempt: SEARCH_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Policy applied to `search_issues` calls: 60 s per attempt, 10 attempts.
    pub fn search_issues() -> Self {
        Self {
            per_attempt: SEARCH_ISSUES_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Returns the deadline applied to each attempt.
    pub fn per_attempt(self) -> Duration {
        self.per_attempt
    }

    /// Returns the total number of attempts permitted.
    pub fn max_attempts(self) -> u32 {
        self.max_attempts
    }

    /// Returns the backoff to wait before starting `attempt`.
    ///
    /// Linear: attempt 2 waits 2 s, attempt 3 waits 3 s, and so on.
    pub fn backoff_before(self, attempt: u32) -> Duration {
        Duration::from_secs(u64::from(attempt))
    }
}

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Errors produced by gateway calls, issue construction, and client setup.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A raw issue payload had no top-level `"fields"` entry.
    #[error("Issue payload has no \"fields\" entry")]
    MissingFields,

    /// A raw issue payload's `"fields"` entry was present but not a mapping.
    #[error("Issue payload \"fields\" entry is not a mapping (found {found})")]
    MalformedFields {
        /// JSON type name of the value that was found.
        found: &'static str,
    },

    /// Every attempt of a call hit its deadline.
    ///
    /// Produced only after the attempt budget of the [`TimeoutPolicy`] is
    /// exhausted; individual attempt timeouts are never surfaced.
    #[error("{operation} timed out: {attempts} attempts of {per_attempt:?} each")]
    TimeoutExceeded {
        /// Name of the gateway operation that timed out.
        operation: &'static str,
        /// Deadline applied to each attempt.
        per_attempt: Duration,
        /// Number of attempts made.
        attempts: u32,
    },

    /// The issue tracker client failed (transport, authentication, malformed
    /// query, unexpected response).
    ///
    /// Never retried. The client's error is kept as the source.
    #[error("Issue tracker request failed: {0}")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The client configuration is invalid.
    ///
    /// Produced at setup time; a gateway is never built from an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl TrackerError {
    /// Wraps any client-side error as [`TrackerError::Collaborator`].
    pub fn collaborator(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Collaborator(err.into())
    }

    /// Creates a [`TrackerError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if this error means the call ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutExceeded { .. })
    }
}
