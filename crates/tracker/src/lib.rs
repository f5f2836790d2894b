//! Issue tracker query domain.
//!
//! This crate holds every type shared between the query gateway and the
//! tracker clients: the issue projection, search request/response types,
//! the timeout policy, the error type, and the port traits clients implement.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies.
//! It defines *what* a tracker client must supply; infrastructure crates
//! define *how*.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `Jql`, `IssueKey`, `QueryId` |
//! | [`types`] | `SearchOptions`, `SearchResult` |
//! | [`issue`] | `Issue` projection, `Record`, `RecordValue` |
//! | [`errors`] | `TrackerError` and `TimeoutPolicy` |
//! | [`ports`] | `IssueSearchClient` and `Sleeper` traits |

pub mod errors;
pub mod identifiers;
pub mod issue;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{
    TimeoutPolicy, TrackerError, DEFAULT_MAX_ATTEMPTS, SEARCH_ISSUES_TIMEOUT, SEARCH_TIMEOUT,
};
pub use identifiers::{IssueKey, Jql, QueryId};
pub use issue::{Issue, Record, RecordValue, DEFAULT_TIMESTAMP_FORMAT};
pub use ports::{IssueSearchClient, Sleeper};
pub use types::{SearchOptions, SearchResult};
