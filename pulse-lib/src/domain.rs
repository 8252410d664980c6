use serde::{Deserialize, Serialize};
use std::fmt;

/// Extract the domain of an endpoint URL.
///
/// The scheme (everything up to and including the first `//`) is dropped,
/// then everything from the first `/` onwards (the path), and finally
/// everything from the first `:` onwards (the port). Domain names cannot
/// contain colons, so the remainder after a colon is assumed to be a port.
///
/// This never fails: malformed input still yields *some* string slice of
/// the input, which keeps the function usable on the hot path of every
/// probe.
///
/// # Examples
///
/// ```
/// use pulse_lib::extract_domain;
///
/// assert_eq!(extract_domain("https://localhost:8080/a/b"), "localhost");
/// assert_eq!(extract_domain("https://blog.example.com/about"), "blog.example.com");
/// assert_eq!(extract_domain("www.example.com"), "www.example.com");
/// ```
#[must_use]
pub fn extract_domain(url: &str) -> &str {
    let without_scheme = url.split_once("//").map_or(url, |(_, rest)| rest);
    let host_and_port = without_scheme
        .split_once('/')
        .map_or(without_scheme, |(host, _)| host);
    host_and_port
        .split_once(':')
        .map_or(host_and_port, |(host, _)| host)
}

/// The key under which probes are gated and availability is aggregated.
///
/// Unlike a fully parsed URL host, a `Domain` is taken verbatim from the
/// endpoint URL (see [`extract_domain`]); no case normalisation happens.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Build the domain key for the given endpoint URL
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        Domain(extract_domain(url).to_string())
    }

    /// Get the domain as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the domain as an owned String
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Domain {
    fn from(domain: &str) -> Self {
        Domain(domain.to_string())
    }
}

impl From<String> for Domain {
    fn from(domain: String) -> Self {
        Domain(domain)
    }
}
