//! Errors surfaced by client construction and API calls.

use bridge::{ApiResponse, BridgeError};

use crate::host::HostError;

/// Errors produced by the CustomerProfiles client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A client options object could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// Both transport override flags were set.
    #[error("cannot force both direct and widget api communication at the same time")]
    ConflictingOverrides,

    /// The instance URL has no host to compare against the page.
    #[error("invalid instance url: {0}")]
    InvalidUrl(String),

    /// The call failed with a status, either from the backend or the
    /// synthetic not-ready response of the widget transport.
    #[error("api call failed: status {} {}", .0.status, .0.status_text)]
    Api(ApiResponse),

    /// A browser collaborator (fetch, DOM, message channel) failed.
    #[error("host call failed: {0}")]
    Host(#[from] HostError),

    /// The widget frame replied with something that is not an `api_response`.
    #[error("widget reply rejected: {0}")]
    Bridge(#[from] BridgeError),
}

impl Error {
    /// Stable code for the error kind, handed to JavaScript callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::ConflictingOverrides => "E_CONFLICTING_OVERRIDES",
            Self::InvalidUrl(_) => "E_INVALID_URL",
            Self::Api(_) => "E_API_RESPONSE",
            Self::Host(_) => "E_HOST",
            Self::Bridge(_) => "E_BRIDGE",
        }
    }

    /// The response carried by a failed call, if any.
    #[must_use]
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            Self::Api(resp) => Some(resp),
            _ => None,
        }
    }

    /// Whether this is the widget transport's not-ready rejection.
    #[must_use]
    pub fn is_not_ready(&self) -> bool {
        self.response().is_some_and(|resp| *resp == ApiResponse::not_ready())
    }
}
