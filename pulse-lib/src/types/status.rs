use std::fmt::Display;

use crate::ErrorKind;
use http::StatusCode;

/// Outcome of a single probe.
#[allow(variant_size_differences)]
#[derive(Debug)]
pub enum ProbeStatus {
    /// The endpoint answered with a 2xx status code
    Up(StatusCode),
    /// The endpoint answered, but not with a 2xx status code
    Down(StatusCode),
    /// The request did not complete before its deadline
    Timeout,
    /// The request failed in transit, e.g. connection refused or DNS failure,
    /// or was rejected when sent, e.g. a URL without a scheme
    Error(ErrorKind),
    /// The request could not be built or dispatched at all.
    ///
    /// Such probes are not counted towards availability.
    Invalid(ErrorKind),
}

impl ProbeStatus {
    /// Classify a received status code
    #[must_use]
    pub fn from_code(code: StatusCode) -> Self {
        if code.is_success() {
            Self::Up(code)
        } else {
            Self::Down(code)
        }
    }

    /// Classify a transport error
    #[must_use]
    pub fn from_error(error: ErrorKind) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Error(error)
        }
    }

    /// Returns `true` if the probe counts as a success
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Up(_))
    }

    /// Returns `true` if the probe contributes to the domain's counters
    #[inline]
    #[must_use]
    pub const fn is_counted(&self) -> bool {
        !matches!(self, Self::Invalid(_))
    }

    /// Returns `true` if the probe ran past its deadline
    #[inline]
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns the status code of the response, if one was received
    #[must_use]
    pub const fn code(&self) -> Option<StatusCode> {
        match self {
            Self::Up(code) | Self::Down(code) => Some(*code),
            _ => None,
        }
    }
}

impl Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up(code) | Self::Down(code) => write!(f, "{code}"),
            Self::Timeout => f.write_str("Timeout"),
            Self::Error(e) => write!(f, "{e}"),
            Self::Invalid(e) => write!(f, "Invalid request: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_codes() {
        assert!(ProbeStatus::from_code(StatusCode::OK).is_success());
        assert!(ProbeStatus::from_code(StatusCode::NO_CONTENT).is_success());
        assert!(!ProbeStatus::from_code(StatusCode::MULTIPLE_CHOICES).is_success());
        assert!(!ProbeStatus::from_code(StatusCode::INTERNAL_SERVER_ERROR).is_success());
        assert!(ProbeStatus::from_code(StatusCode::INTERNAL_SERVER_ERROR).is_counted());
    }

    #[test]
    fn test_invalid_is_not_counted() {
        let status = ProbeStatus::Invalid(ErrorKind::InvalidMethod("G E T".into()));
        assert!(!status.is_counted());
        assert!(!status.is_success());
        assert_eq!(status.code(), None);
        assert_eq!(status.to_string(), "Invalid request: Invalid HTTP method `G E T`");
    }

    #[test]
    fn test_display_code() {
        assert_eq!(
            ProbeStatus::from_code(StatusCode::NOT_FOUND).to_string(),
            "404 Not Found"
        );
        assert_eq!(ProbeStatus::Timeout.to_string(), "Timeout");
    }
}
