//! Error types for statistics fetching.

use thiserror::Error;

/// Failure to produce a statistics snapshot.
///
/// Cloneable so one failed fetch can be reported to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// The API answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// GraphQL-level errors reported by the API.
    #[error("API error: {0}")]
    Api(String),

    /// The requested profile does not exist.
    #[error("User not found or invalid response")]
    UserNotFound,

    /// No API token is available.
    #[error("GitHub token not configured")]
    MissingToken,

    /// The background fetch ended without reporting.
    #[error("fetch task failed: {0}")]
    Task(String),
}

impl StatsError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StatsError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Result type for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_contains_code() {
        let err = StatsError::Status { status: 503 };
        assert_eq!(err.to_string(), "HTTP error! status: 503");
        assert_eq!(err.status(), Some(503));
        assert_eq!(StatsError::UserNotFound.status(), None);
    }
}
