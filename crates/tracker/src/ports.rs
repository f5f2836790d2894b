//! Port traits implemented by infrastructure crates.
//!
//! The gateway only ever talks to the issue tracker through
//! [`IssueSearchClient`] and only ever waits through [`Sleeper`], so both can
//! be replaced with fakes in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::{Jql, SearchOptions, SearchResult, TrackerError};

/// Search capability of an issue tracker client.
///
/// Implementations own transport, authentication, and wire format. They must
/// not apply their own retry: the gateway's timeout loop is the only retry
/// layer, and every error returned here is surfaced to the caller unchanged.
#[async_trait]
pub trait IssueSearchClient: Send + Sync {
    /// Endpoint, credential, and transport settings the client is built from.
    type Config: Send;

    /// Builds a ready client from its configuration.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Configuration`] if the configuration is unusable.
    fn configure(config: Self::Config) -> Result<Self, TrackerError>
    where
        Self: Sized;

    /// Runs one search against the tracker.
    ///
    /// `options.max_results` and `options.extra` are forwarded as-is.
    async fn search(
        &self,
        query: &Jql,
        options: &SearchOptions,
    ) -> Result<SearchResult, TrackerError>;
}

/// Waits between retry attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}
