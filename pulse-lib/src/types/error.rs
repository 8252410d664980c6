use std::path::PathBuf;
use thiserror::Error;

/// Possible errors when interacting with `pulse_lib`
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An admission gate was requested with room for no requests at all
    #[error("Maximum concurrency per domain must be greater than 0 (got {0})")]
    InvalidCapacity(usize),

    /// The endpoint list could not be read from disk
    #[error("Failed to read endpoint list from `{}`: {source}", path.display())]
    ReadEndpoints {
        /// Location of the endpoint list
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The endpoint list is not a valid YAML sequence of endpoints
    #[error("Failed to parse endpoint list: {0}")]
    ParseEndpoints(#[from] serde_yaml::Error),

    /// An endpoint in the list is missing a required field
    #[error("Endpoint #{index} is invalid: {reason}")]
    InvalidEndpoint {
        /// Zero-based position of the endpoint in the list
        index: usize,
        /// Human-readable description of the problem
        reason: String,
    },

    /// The endpoint method is not a valid HTTP method token
    #[error("Invalid HTTP method `{0}`")]
    InvalidMethod(String),

    /// The endpoint URL cannot be parsed
    #[error("Cannot parse `{url}` as URL: {source}")]
    InvalidUrl {
        /// The URL as given in the endpoint list
        url: String,
        /// The underlying parse error
        #[source]
        source: url::ParseError,
    },

    /// A configured header name or value is not valid HTTP
    #[error("Header `{0}` could not be parsed")]
    InvalidHeader(String),

    /// The shared HTTP client could not be created
    #[error("Failed to create the HTTP client: {0}")]
    BuildClient(#[source] reqwest::Error),

    /// The HTTP request for an endpoint could not be assembled
    #[error("Failed to build request: {0}")]
    BuildRequest(#[source] reqwest::Error),

    /// Network error while sending the request, including exceeded deadlines
    #[error("Network error: {0}")]
    NetworkRequest(#[source] reqwest::Error),

    /// The body of a response could not be read
    #[error("Error reading response body: {0}")]
    ReadResponseBody(#[source] reqwest::Error),

    /// The admission gate was closed while waiting for a permit
    #[error("Admission gate for `{0}` was closed")]
    GateClosed(String),
}

impl ErrorKind {
    /// Returns `true` if the error is a request that ran past its deadline
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NetworkRequest(e) if e.is_timeout())
    }

    /// Returns `true` for request construction errors that HTTP clients
    /// usually only report once the request is sent.
    ///
    /// A URL without a scheme and a malformed header are accepted while
    /// building the request and rejected on dispatch, so they count as failed
    /// probes instead of unusable endpoints.
    #[must_use]
    pub fn fails_on_dispatch(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeader(_)
                | Self::InvalidUrl {
                    source: url::ParseError::RelativeUrlWithoutBase,
                    ..
                }
        )
    }
}
