//! Errors raised by the Jira client.
//!
//! Every [`JiraError`] reaches callers as [`TrackerError::Collaborator`], with
//! the `JiraError` kept as the source.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracker::TrackerError;

/// Failures talking to a Jira site.
#[derive(Debug, Error)]
pub enum JiraError {
    /// The request could not be sent or the response could not be read.
    #[error("HTTP request to Jira failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Jira answered with a non-success status.
    #[error("Jira returned {status}: {message}")]
    Status {
        /// HTTP status of the response.
        status: StatusCode,
        /// Jira's error messages, or the start of the response body.
        message: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("Unexpected response body from Jira: {0}")]
    Decode(#[source] serde_json::Error),
}

impl JiraError {
    /// The HTTP status Jira answered with, if the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(e) => e.status(),
            Self::Status { status, .. } => Some(*status),
            Self::Decode(_) => None,
        }
    }

    /// Builds a [`JiraError::Status`] from an error response body.
    ///
    /// Jira reports failures as `{"errorMessages": [...], "errors": {...}}`;
    /// when the body has that shape the messages are joined, otherwise the
    /// first 200 characters of the body are used.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) if !parsed.is_empty() => parsed.join(),
            _ => body.chars().take(200).collect(),
        };
        Self::Status { status, message }
    }
}

impl From<JiraError> for TrackerError {
    fn from(err: JiraError) -> Self {
        TrackerError::collaborator(err)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: serde_json::Map<String, serde_json::Value>,
}

impl ErrorBody {
    fn is_empty(&self) -> bool {
        self.error_messages.is_empty() && self.errors.is_empty()
    }

    fn join(&self) -> String {
        let field_errors = self.errors.iter().map(|(field, message)| match message {
            serde_json::Value::String(s) => format!("{field}: {s}"),
            other => format!("{field}: {other}"),
        });
        self.error_messages
            .iter()
            .cloned()
            .chain(field_errors)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
