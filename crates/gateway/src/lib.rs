//! Issue tracker query gateway.
//!
//! [`QueryGateway`] runs searches through an [`tracker::IssueSearchClient`]
//! under a per-attempt deadline with bounded linear-backoff retry, and turns
//! raw results into [`tracker::Issue`] values.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The gateway sequences calls between the domain
//! types in [`tracker`] and a concrete client (e.g. the `jira` crate). It holds
//! no transport code and no domain rules of its own beyond the retry policy.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`retry`] | `timeout_and_retry`, `TokioSleeper` |
//! | [`query`] | `QueryGateway` |

pub mod query;
pub mod retry;

pub use query::QueryGateway;
pub use retry::{timeout_and_retry, TokioSleeper};
