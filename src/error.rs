//! Error types for the fitpower-agent library.

use std::fmt::Display;

use thiserror::Error;

/// Errors that can occur while handling agent events.
#[derive(Error, Debug)]
pub enum Error {
    /// The network could not produce a response.
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP transport error from the network implementation.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cache storage rejected an operation.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The host failed to display a notification.
    #[error("Notification error: {0}")]
    Notification(String),

    /// A window client operation (navigate, focus, open, claim) failed.
    #[error("Client error: {0}")]
    Client(String),

    /// Push payload was present but not valid JSON for the payload schema.
    #[error("Invalid push payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A path or origin could not be turned into a URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for fitpower-agent operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Marks an operation whose failure is deliberately discarded.
///
/// Used for side effects such as storing a fresh response in the cache or
/// navigating a window before focusing it: the caller proceeds regardless of
/// the outcome, and the discarded error is logged at debug level.
pub trait BestEffort {
    /// Consumes the result, logging and dropping any error.
    fn best_effort(self, what: &str);
}

impl<T, E: Display> BestEffort for std::result::Result<T, E> {
    fn best_effort(self, what: &str) {
        if let Err(e) = self {
            log::debug!("{what} failed (ignored): {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_effort_discards_errors() {
        let failed: Result<()> = Err(Error::Cache("quota exceeded".to_string()));
        failed.best_effort("storing response");

        let ok: Result<u32> = Ok(7);
        ok.best_effort("storing response");
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::Cache("Request method 'POST' is unsupported".to_string()).to_string(),
            "Cache error: Request method 'POST' is unsupported"
        );
        assert_eq!(
            Error::Network("connection refused".to_string()).to_string(),
            "Network error: connection refused"
        );
    }

    #[test]
    fn payload_error_from_json() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Payload(_)));
    }
}
