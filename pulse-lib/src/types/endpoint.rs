use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::{Domain, ErrorKind, Result};

/// Method used for endpoints that do not specify one
pub const DEFAULT_METHOD: &str = "GET";

/// A single HTTP endpoint to probe.
///
/// Endpoints are loaded once at startup and stay read-only for the lifetime
/// of the process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Endpoint {
    /// Name of the endpoint, used in log messages
    pub name: String,
    /// URL to send the request to
    pub url: String,
    /// HTTP method, e.g. `GET` or `POST`
    #[serde(default = "default_method", deserialize_with = "deserialize_method")]
    pub method: String,
    /// Headers sent with every probe of this endpoint
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Request body, only sent when non-empty
    #[serde(default)]
    pub body: String,
}

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

// An explicit `method: ""` or `method: ~` behaves like a missing method
fn deserialize_method<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let method = Option::<String>::deserialize(deserializer)?;
    Ok(method
        .filter(|m| !m.is_empty())
        .unwrap_or_else(default_method))
}

impl Endpoint {
    /// Create a `GET` endpoint without headers or body
    #[must_use]
    pub fn new<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: default_method(),
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    /// The domain this endpoint is gated and aggregated under
    #[must_use]
    pub fn domain(&self) -> Domain {
        Domain::from_url(&self.url)
    }
}

/// Parse a YAML endpoint list.
///
/// # Errors
///
/// Returns an error if the document is not a sequence of endpoints or if
/// an endpoint has an empty `name` or `url`.
pub fn parse_endpoints(contents: &str) -> Result<Vec<Endpoint>> {
    // An empty document is an empty list rather than a parse error
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let endpoints: Vec<Endpoint> = serde_yaml::from_str(contents)?;
    for (index, endpoint) in endpoints.iter().enumerate() {
        if endpoint.name.trim().is_empty() {
            return Err(ErrorKind::InvalidEndpoint {
                index,
                reason: "`name` must not be empty".to_string(),
            });
        }
        if endpoint.url.trim().is_empty() {
            return Err(ErrorKind::InvalidEndpoint {
                index,
                reason: format!("`url` of `{}` must not be empty", endpoint.name),
            });
        }
    }
    Ok(endpoints)
}

/// Load and validate the YAML endpoint list at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not contain a valid
/// endpoint list (see [`parse_endpoints`]).
pub fn load_endpoints(path: &Path) -> Result<Vec<Endpoint>> {
    let contents = fs::read_to_string(path).map_err(|source| ErrorKind::ReadEndpoints {
        path: path.to_path_buf(),
        source,
    })?;
    parse_endpoints(&contents)
}
