//! Error types for the Gitea client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the Gitea client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Connection Errors
    // ============================================================================
    #[error("Failed to open connection to {server_url}: {source}")]
    ConnectionOpen {
        server_url: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Connection used after it was closed")]
    UseAfterClose,

    #[error("Request interrupted")]
    Interrupted,

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("No auth converter accepts credentials of type {credential_type}")]
    Conversion { credential_type: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a connection open error wrapping its cause
    pub fn connection_open(server_url: impl Into<String>, source: Error) -> Self {
        Self::ConnectionOpen {
            server_url: server_url.into(),
            source: Box::new(source),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a conversion error for the named credential type
    pub fn conversion(credential_type: impl Into<String>) -> Self {
        Self::Conversion {
            credential_type: credential_type.into(),
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is an HTTP 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type alias for the Gitea client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::conversion("my_crate::SshKey");
        assert_eq!(
            err.to_string(),
            "No auth converter accepts credentials of type my_crate::SshKey"
        );
    }

    #[test]
    fn test_connection_open_keeps_cause() {
        let cause = Error::config("bad scheme");
        let err = Error::connection_open("ftp://example.com", cause);
        assert!(err.to_string().contains("ftp://example.com"));

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "Configuration error: bad scheme");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::http_status(404, "").is_not_found());
        assert!(!Error::http_status(500, "").is_not_found());
        assert!(!Error::UseAfterClose.is_not_found());
        assert_eq!(Error::http_status(403, "").status(), Some(403));
        assert_eq!(Error::Interrupted.status(), None);
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
