//! HTTP client for the Jira REST search API.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use tracker::{IssueSearchClient, Jql, SearchOptions, SearchResult, TrackerError};

use crate::{JiraConfig, JiraError};

/// Path of the search resource, relative to the site endpoint.
pub const SEARCH_PATH: &str = "rest/api/2/search";

/// Path of the current-user resource, relative to the site endpoint.
pub const MYSELF_PATH: &str = "rest/api/2/myself";

/// Jira REST client implementing [`IssueSearchClient`].
///
/// No request timeout is configured on the HTTP client; the gateway's
/// per-attempt deadline bounds every call.
#[derive(Clone)]
pub struct JiraClient {
    http: Client,
    search_url: Url,
    myself_url: Url,
    username: String,
    password: String,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("search_url", &self.search_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// The account the configured credentials belong to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Display name, e.g. `"Jane Doe"`.
    #[serde(default)]
    pub display_name: String,
    /// E-mail address, when visible to the caller.
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    jql: &'a str,
    #[serde(flatten)]
    options: &'a SearchOptions,
}

impl JiraClient {
    /// Builds a client for the site described by `config`.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Configuration`] if `config` fails validation or the
    /// HTTP client cannot be built.
    pub fn new(config: JiraConfig) -> Result<Self, TrackerError> {
        let endpoint = config.validate()?;
        let http = Client::builder()
            .user_agent(concat!("jira-records/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrackerError::configuration(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            http,
            search_url: resource_url(&endpoint, SEARCH_PATH)?,
            myself_url: resource_url(&endpoint, MYSELF_PATH)?,
            username: config.username,
            password: config.password,
        })
    }

    /// URL searches are posted to.
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Fetches the account behind the configured credentials.
    ///
    /// # Errors
    ///
    /// [`TrackerError::Collaborator`] wrapping a [`JiraError`] if the site is
    /// unreachable or rejects the credentials.
    #[instrument(skip(self), fields(url = %self.myself_url))]
    pub async fn check_credentials(&self) -> Result<Account, TrackerError> {
        let response = self
            .http
            .get(self.myself_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(JiraError::from)?;
        let account: Account = decode(response).await?;
        debug!(display_name = %account.display_name, "credentials accepted");
        Ok(account)
    }
}

#[async_trait]
impl IssueSearchClient for JiraClient {
    type Config = JiraConfig;

    fn configure(config: Self::Config) -> Result<Self, TrackerError> {
        Self::new(config)
    }

    #[instrument(skip(self, options), fields(url = %self.search_url, max_results = ?options.max_results))]
    async fn search(
        &self,
        query: &Jql,
        options: &SearchOptions,
    ) -> Result<SearchResult, TrackerError> {
        let request = SearchRequest {
            jql: query.as_str(),
            options,
        };
        let response = self
            .http
            .post(self.search_url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .await
            .map_err(JiraError::from)?;

        let result: SearchResult = decode(response).await?;
        debug!(
            returned = result.issues.len(),
            total = result.total,
            "search page received"
        );
        Ok(result)
    }
}

/// Joins `path` onto `endpoint`, keeping any sub-path the endpoint has
/// (e.g. `https://host/jira` + `rest/api/2/search`).
fn resource_url(endpoint: &Url, path: &str) -> Result<Url, TrackerError> {
    let mut base = endpoint.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
        .map_err(|e| TrackerError::configuration(format!("invalid Jira endpoint: {e}")))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, JiraError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(JiraError::from_response(status, &body));
    }
    serde_json::from_str(&body).map_err(JiraError::Decode)
}
