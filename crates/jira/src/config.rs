//! Connection settings for a Jira site.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracker::TrackerError;

/// Endpoint and credentials for one Jira site.
///
/// `password` may be an account password (Jira Server) or an API token
/// (Jira Cloud); both are sent with HTTP basic authentication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Base URL of the site, e.g. `https://example.atlassian.net` or
    /// `https://tracker.example.com/jira`.
    pub endpoint: String,

    /// User name or account e-mail.
    pub username: String,

    /// Password or API token.
    #[serde(default)]
    pub password: String,
}

impl JiraConfig {
    /// Creates a configuration from its parts.
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Checks the settings and returns the parsed endpoint.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Configuration`] if the user name or password is empty,
    /// or the endpoint is not an absolute `http`/`https` URL.
    pub fn validate(&self) -> Result<Url, TrackerError> {
        if self.username.trim().is_empty() {
            return Err(TrackerError::configuration("Username or email could not be empty"));
        }
        if self.password.is_empty() {
            return Err(TrackerError::configuration("Password could not be empty"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(TrackerError::configuration("Jira API endpoint could not be empty"));
        }

        let url = Url::parse(self.endpoint.trim()).map_err(|e| {
            TrackerError::configuration(format!("Jira API endpoint is not a valid URL: {e}"))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(TrackerError::configuration(format!(
                "Jira API endpoint must use http or https, not {other}"
            ))),
        }
    }
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
