//! Error types for marque.

use thiserror::Error;

/// Result type alias using marque's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for marque operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Required credentials are missing at construction time
    #[error("Unconfigured: {0}")]
    Unconfigured(String),

    /// Bookmark service rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bookmark service rejected the request body
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unclassified HTTP failure from the bookmark service
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Web search provider failed
    #[error("Search error: {0}")]
    Search(String),

    /// Readable-content extraction failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Job queue error
    #[error("Job error: {0}")]
    Job(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// True for outcomes a task treats as "nothing to do" rather than a failure.
    ///
    /// Extraction and search misses are logged and skipped; every other
    /// variant propagates to the job worker for its retry policy.
    pub fn is_soft(&self) -> bool {
        matches!(self, Error::Extraction(_) | Error::Search(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unconfigured() {
        let err = Error::Unconfigured("bookmark host is required".to_string());
        assert_eq!(err.to_string(), "Unconfigured: bookmark host is required");
    }

    #[test]
    fn test_error_display_authentication() {
        let err = Error::Authentication("check your API key".to_string());
        assert_eq!(err.to_string(), "Authentication failed: check your API key");
    }

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("bookmark 42".to_string());
        assert_eq!(err.to_string(), "Not found: bookmark 42");
    }

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("bad url".to_string());
        assert_eq!(err.to_string(), "Validation error: bad url");
    }

    #[test]
    fn test_error_display_http() {
        let err = Error::Http {
            status: 502,
            body: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: upstream down");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("model timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: model timeout");
    }

    #[test]
    fn test_error_display_job() {
        let err = Error::Job("queue full".to_string());
        assert_eq!(err.to_string(), "Job error: queue full");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_soft_errors() {
        assert!(Error::Extraction("low confidence".into()).is_soft());
        assert!(Error::Search("no results".into()).is_soft());
        assert!(!Error::Validation("bad url".into()).is_soft());
        assert!(!Error::Http {
            status: 500,
            body: String::new()
        }
        .is_soft());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }
}
