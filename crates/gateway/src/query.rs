//! The query gateway: tracker searches wrapped in the timeout-and-retry loop.

use tracing::{debug, info_span, Instrument};
use tracker::{
    Issue, IssueSearchClient, Jql, QueryId, SearchOptions, SearchResult, Sleeper, TimeoutPolicy,
    TrackerError,
};

use crate::retry::{timeout_and_retry, TokioSleeper};

/// Runs issue tracker searches with per-attempt deadlines and bounded retry.
///
/// Built once per configured client and reused for any number of queries.
/// Holds no mutable state; concurrent calls on a shared gateway are
/// independent of each other.
#[derive(Debug)]
pub struct QueryGateway<C, S = TokioSleeper> {
    client: C,
    sleeper: S,
    search_policy: TimeoutPolicy,
    issues_policy: TimeoutPolicy,
}

impl<C: IssueSearchClient> QueryGateway<C, TokioSleeper> {
    /// Configures the tracker client and returns a ready gateway using the
    /// default policies ([`TimeoutPolicy::search`] and
    /// [`TimeoutPolicy::search_issues`]).
    ///
    /// # Errors
    ///
    /// Whatever [`IssueSearchClient::configure`] rejects.
    pub fn setup(config: C::Config) -> Result<Self, TrackerError> {
        Ok(Self::new(C::configure(config)?))
    }

    /// Wraps an already configured client using the default policies.
    pub fn new(client: C) -> Self {
        Self::with_policies(
            client,
            TimeoutPolicy::search(),
            TimeoutPolicy::search_issues(),
            TokioSleeper,
        )
    }
}

impl<C: IssueSearchClient, S: Sleeper> QueryGateway<C, S> {
    /// Builds a gateway with explicit policies and backoff sleeper.
    pub fn with_policies(
        client: C,
        search_policy: TimeoutPolicy,
        issues_policy: TimeoutPolicy,
        sleeper: S,
    ) -> Self {
        Self {
            client,
            sleeper,
            search_policy,
            issues_policy,
        }
    }

    /// Replaces the policy used by [`Self::search`] and [`Self::total_count`].
    #[must_use]
    pub fn with_search_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.search_policy = policy;
        self
    }

    /// Replaces the policy used by [`Self::search_issues`].
    #[must_use]
    pub fn with_issues_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.issues_policy = policy;
        self
    }

    /// The configured tracker client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Policy applied to raw searches.
    pub fn search_policy(&self) -> TimeoutPolicy {
        self.search_policy
    }

    /// Policy applied to issue searches.
    pub fn issues_policy(&self) -> TimeoutPolicy {
        self.issues_policy
    }

    /// Searches and converts every returned payload into an [`Issue`],
    /// preserving tracker order.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::TimeoutExceeded`] when every attempt times out.
    /// - The client's error, unchanged, on first occurrence.
    /// - [`TrackerError::MissingFields`] / [`TrackerError::MalformedFields`]
    ///   if the tracker returned a payload that is not an issue.
    pub async fn search_issues(
        &self,
        query: &Jql,
        options: &SearchOptions,
    ) -> Result<Vec<Issue>, TrackerError> {
        let span = query_span("search_issues", query);
        async {
            let result = self
                .run("search_issues", self.issues_policy, query, options)
                .await?;
            let issues = result
                .issues
                .into_iter()
                .map(Issue::from_raw)
                .collect::<Result<Vec<_>, _>>()?;
            debug!(issues = issues.len(), total = result.total, "issues projected");
            Ok::<_, TrackerError>(issues)
        }
        .instrument(span)
        .await
    }

    /// Searches and returns the client's raw result.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::TimeoutExceeded`] when every attempt times out.
    /// - The client's error, unchanged, on first occurrence.
    pub async fn search(
        &self,
        query: &Jql,
        options: &SearchOptions,
    ) -> Result<SearchResult, TrackerError> {
        let span = query_span("search", query);
        async {
            let result = self
                .run("search", self.search_policy, query, options)
                .await?;
            debug!(issues = result.issues.len(), total = result.total, "search finished");
            Ok::<_, TrackerError>(result)
        }
        .instrument(span)
        .await
    }

    /// Number of issues matching `query`.
    ///
    /// Asks for a single-issue page and reads the tracker's total, which does
    /// not depend on the page size.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search`].
    pub async fn total_count(&self, query: &Jql) -> Result<u64, TrackerError> {
        let result = self
            .search(query, &SearchOptions::with_max_results(1))
            .await?;
        Ok(result.total)
    }

    async fn run(
        &self,
        operation: &'static str,
        policy: TimeoutPolicy,
        query: &Jql,
        options: &SearchOptions,
    ) -> Result<SearchResult, TrackerError> {
        timeout_and_retry(operation, policy, &self.sleeper, || {
            self.client.search(query, options)
        })
        .await
    }
}

fn query_span(operation: &'static str, query: &Jql) -> tracing::Span {
    let query_id = QueryId::new_random();
    info_span!("tracker_query", %query_id, operation, jql = %query)
}
