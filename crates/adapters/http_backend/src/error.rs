//! HTTP backend adapter error types.

use gecko_domain::error::GeckoError;

/// Errors specific to the HTTP backend adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpBackendError {
    /// The configured base URL (or an endpoint joined to it) is not a valid URL.
    #[error("invalid backend url")]
    InvalidUrl(#[source] url::ParseError),

    /// The request could not be sent or its response could not be read.
    #[error("request to backend failed")]
    Transport(#[source] reqwest::Error),

    /// The executor answered with a non-success status.
    #[error("backend answered {status} on {endpoint}: {message}")]
    Status {
        endpoint: &'static str,
        status: u16,
        message: String,
    },

    /// The executor's response body was not what the endpoint promises.
    #[error("unexpected response from {endpoint}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for HttpBackendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl From<HttpBackendError> for GeckoError {
    fn from(err: HttpBackendError) -> Self {
        GeckoError::Backend(Box::new(err))
    }
}
