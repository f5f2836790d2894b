//! Configuration file loading.
//!
//! ```toml
//! [jira]
//! endpoint = "https://example.atlassian.net"
//! username = "me@example.com"
//! password = "api-token"          # or set JIRA_PASSWORD
//!
//! [policy]                        # optional
//! search_timeout_secs = 5
//! search_issues_timeout_secs = 60
//! retry_limit = 10
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use jira::JiraConfig;
use serde::Deserialize;
use tracker::{TimeoutPolicy, DEFAULT_MAX_ATTEMPTS, SEARCH_ISSUES_TIMEOUT, SEARCH_TIMEOUT};

/// Upper bound on `retry_limit`; beyond this a slow tracker is effectively down.
pub const MAX_RETRY_LIMIT: u32 = 10;

/// Contents of the configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Site endpoint and credentials.
    pub jira: JiraConfig,

    /// Timeout and retry overrides.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Per-attempt deadlines and attempt budget for gateway calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Deadline for each attempt of a raw search or count.
    pub search_timeout_secs: u64,
    /// Deadline for each attempt of an issue search.
    pub search_issues_timeout_secs: u64,
    /// Attempts per call, between 1 and [`MAX_RETRY_LIMIT`].
    pub retry_limit: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            search_timeout_secs: SEARCH_TIMEOUT.as_secs(),
            search_issues_timeout_secs: SEARCH_ISSUES_TIMEOUT.as_secs(),
            retry_limit: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PolicyConfig {
    /// Policy for `search` and `total_count`.
    pub fn search_policy(&self) -> Result<TimeoutPolicy> {
        self.policy(self.search_timeout_secs, "search_timeout_secs")
    }

    /// Policy for `search_issues`.
    pub fn issues_policy(&self) -> Result<TimeoutPolicy> {
        self.policy(self.search_issues_timeout_secs, "search_issues_timeout_secs")
    }

    fn policy(&self, secs: u64, name: &str) -> Result<TimeoutPolicy> {
        if self.retry_limit == 0 || self.retry_limit > MAX_RETRY_LIMIT {
            bail!("Retry limit should be between 1 and {MAX_RETRY_LIMIT}");
        }
        TimeoutPolicy::new(Duration::from_secs(secs), self.retry_limit)
            .with_context(|| format!("{name} should be greater than 0"))
    }
}

impl CliConfig {
    /// Reads and parses the configuration file at `path`.
    ///
    /// A `password_override` (e.g. from `JIRA_PASSWORD`) replaces the file's
    /// password.
    pub fn load(path: &Path, password_override: Option<String>) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text, password_override)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parses configuration from TOML text.
    pub fn parse(text: &str, password_override: Option<String>) -> Result<Self> {
        let mut config: CliConfig = toml::from_str(text)?;
        if let Some(password) = password_override {
            config.jira.password = password;
        }
        config.policy.search_policy()?;
        config.policy.issues_policy()?;
        Ok(config)
    }
}
