//! Search request and response types.
//!
//! [`SearchOptions`] interprets only the result limit; every other option is
//! carried opaquely to the client. [`SearchResult`] is the client's raw,
//! untransformed answer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Request keys owned by the query and the result limit.
pub const RESERVED_KEYS: [&str; 2] = ["jql", "maxResults"];

/// Options sent alongside a query.
///
/// Only `max_results` is recognised. Anything in `extra` is passed through to
/// the client exactly as given (e.g. `"fields"`, `"expand"`, `"startAt"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Maximum number of issues the tracker should return in one page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,

    /// Uninterpreted options forwarded verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchOptions {
    /// Options limiting the result page to `max_results` issues.
    pub fn with_max_results(max_results: u32) -> Self {
        Self {
            max_results: Some(max_results),
            extra: Map::new(),
        }
    }

    /// Adds an uninterpreted option, replacing any previous value for `key`.
    ///
    /// The reserved keys `"jql"` and `"maxResults"` are dropped; the query
    /// and [`Self::max_results`] are the only sources for those.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            debug!(key = %key, "reserved search option dropped");
        } else {
            self.extra.insert(key, value);
        }
        self
    }
}

// ---------------------------------------------------------------------------

/// The client's response to a search.
///
/// `total` is the number of issues matching the query, reported by the
/// tracker independently of how many issues this page contains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Offset of the first issue in this page.
    #[serde(default)]
    pub start_at: u64,

    /// Page size the tracker applied.
    #[serde(default)]
    pub max_results: u64,

    /// Total number of matching issues.
    #[serde(default)]
    pub total: u64,

    /// Raw issue payloads, in tracker order.
    #[serde(default)]
    pub issues: Vec<Value>,
}
