//! Error types for anyload.
//!
//! Library crates use [`AnyloadError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all anyload operations.
#[derive(Debug, thiserror::Error)]
pub enum AnyloadError {
    /// Loader configuration error, raised at construction time.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while building or driving the fetch client.
    #[error("network error: {0}")]
    Network(String),

    /// Markup or JSON parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A remote reference could not be resolved (fail-hard policy only).
    #[error("error while loading content from {address}: {reason}")]
    Remote { address: String, reason: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AnyloadError>;

impl AnyloadError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a remote-resolution error naming the offending address.
    pub fn remote(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Remote {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = AnyloadError::config("compose:object hook key is empty");
        assert_eq!(
            err.to_string(),
            "config error: compose:object hook key is empty"
        );

        let err = AnyloadError::remote("url(wrong.uri)", "relative URL without a base");
        assert!(err.to_string().contains("url(wrong.uri)"));
    }
}
