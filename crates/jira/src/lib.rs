//! Jira infrastructure adapter.
//!
//! Implements [`tracker::IssueSearchClient`] over the Jira REST API
//! (`POST /rest/api/2/search`) using `reqwest` with HTTP basic authentication.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL construction, authentication, request encoding, and
//! error-body decoding all live here. The [`tracker`] and `gateway` crates see
//! only [`tracker::IssueSearchClient`] and [`tracker::TrackerError`].
//!
//! The client never retries and sets no request timeout of its own; the
//! gateway's timeout loop is the single retry layer.

pub mod client;
pub mod config;
pub mod errors;

pub use client::{Account, JiraClient, MYSELF_PATH, SEARCH_PATH};
pub use config::JiraConfig;
pub use errors::JiraError;
