//! Error taxonomy for backend calls.

use thiserror::Error;

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error taxonomy for calls against the reservation backend.
///
/// Every failure a view can observe falls into one of these categories;
/// the view layer converts them to local UI state (an inline message or a
/// redirect) and never lets them propagate further.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The session is missing, expired, or the CSRF token was stale
    /// (HTTP 401/419).
    ///
    /// During initial session resolution this is an expected outcome, not
    /// an error to report; during explicit actions it surfaces as a
    /// credential problem.
    #[error("not authenticated")]
    Unauthenticated,

    /// The requested resource does not exist or is not visible to the
    /// current user (HTTP 404).
    #[error("not found")]
    NotFound,

    /// The server refused the operation and said why (validation or
    /// conflict, e.g. stock changed concurrently). The message is shown
    /// verbatim.
    #[error("{message}")]
    Rejected {
        /// Human-readable reason, verbatim from the server.
        message: String,
    },

    /// The request never produced a usable response (connection refused,
    /// timeout, TLS failure). Not retried automatically.
    #[error("network error: {0}")]
    Transport(String),

    /// The response arrived but could not be decoded (malformed JSON or an
    /// unknown status code).
    #[error("malformed response: {0}")]
    Decode(String),

    /// The gateway itself was misconfigured (invalid base URL).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns `true` for the silent logged-out outcome of session
    /// resolution.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// The server-provided message when there is one.
    ///
    /// Views fall back to their own generic wording when this is `None`.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_displays_verbatim_message() {
        let err = ApiError::Rejected {
            message: "Stock insuficiente".to_string(),
        };
        assert_eq!(err.to_string(), "Stock insuficiente");
        assert_eq!(err.server_message(), Some("Stock insuficiente"));
    }

    #[test]
    fn transport_has_no_server_message() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.server_message(), None);
    }
}
