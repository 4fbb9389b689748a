use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("No data at {0}")]
    NotFound(String),

    #[error("Invalid JSON payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Run did not finish within {0:?}")]
    DeadlineElapsed(Duration),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Coarse classification used by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection, DNS, TLS or timeout failures
    Network,
    /// Non-success HTTP status other than 404
    Status,
    /// HTTP 404: the endpoint has nothing for this resource
    NotFound,
    /// Body was not valid JSON
    Payload,
    /// Writing the output file failed
    Filesystem,
    Other,
}

impl CalibrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalibrError::Http(e) => match e.status() {
                Some(StatusCode::NOT_FOUND) => ErrorKind::NotFound,
                Some(_) => ErrorKind::Status,
                None => ErrorKind::Network,
            },
            CalibrError::Timeout(_) => ErrorKind::Network,
            CalibrError::Status { .. } => ErrorKind::Status,
            CalibrError::NotFound(_) => ErrorKind::NotFound,
            CalibrError::Payload(_) => ErrorKind::Payload,
            CalibrError::Io(_) => ErrorKind::Filesystem,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, CalibrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let not_found = CalibrError::NotFound("http://x/day/2023-03-18".into());
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert!(not_found.is_not_found());

        let status = CalibrError::Status {
            url: "http://x".into(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        };
        assert_eq!(status.kind(), ErrorKind::Status);
        assert!(!status.is_not_found());

        let io = CalibrError::Io(std::io::Error::other("disk full"));
        assert_eq!(io.kind(), ErrorKind::Filesystem);

        let payload: CalibrError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(payload.kind(), ErrorKind::Payload);

        assert_eq!(
            CalibrError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Network
        );
    }
}
