//! Common types shared across the Glean crates.
//!
//! This crate defines the error taxonomy every component reports through and
//! the observability helpers binaries and tests use to initialise `tracing`.
//! It stays dependency-light so every other crate can depend on it.
//!
//! # Overview
//!
//! - [`GleanError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use glean_common::GleanError;
//!
//! let err = GleanError::Api { status: 401, message: "invalid key".into() };
//! assert_eq!(err.to_string(), "API Error: invalid key");
//! assert!(err.is_remote());
//! ```
pub mod observability;

/// Error types used across the Glean system.
///
/// Each variant renders as a single line suitable for a status banner.
#[derive(thiserror::Error, Debug)]
pub enum GleanError {
    /// The page had no article, no main container and no long paragraphs.
    #[error("No suitable content found on the page")]
    NoContentFound,

    /// No API key was selected, stored or supplied.
    #[error("Please enter or select an API key")]
    MissingCredential,

    /// The resolved API key cannot be sent (non-ASCII or control characters).
    #[error("Invalid API key: {0}")]
    InvalidCredential(String),

    /// The requested action is not one of the known prompt templates.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A successful response did not carry `choices[0].message.content`.
    #[error("Invalid response format from API: {0}")]
    MalformedResponse(String),

    /// The completion API answered with a decodable error body.
    #[error("API Error: {message}")]
    Api { status: u16, message: String },

    /// The completion API answered with a failure whose body could not be decoded.
    #[error("API request failed ({status}): Please check your API key and permissions")]
    Http { status: u16 },

    /// The request never produced a response (DNS, refused connection, TLS...).
    #[error("Network error: Could not connect to the completion API ({0})")]
    Network(String),

    /// The page could not be loaded.
    #[error("Page error: {0}")]
    Page(String),

    /// Persistent key-value storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing the exported document failed.
    #[error("Export error: {0}")]
    Export(String),

    /// Export was requested without any processed text.
    #[error("No processed text to save")]
    NoResult,

    /// Another operation is still in flight.
    #[error("Another operation is in progress: {0}")]
    Busy(String),
}

impl GleanError {
    /// True for failures reported by (or on the way to) the completion API.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Api { .. } | Self::Http { .. } | Self::Network(_) | Self::MalformedResponse(_)
        )
    }
}

/// Convenient alias for results that use [`GleanError`].
pub type Result<T> = std::result::Result<T, GleanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_mentions_status_and_credentials() {
        let msg = GleanError::Http { status: 502 }.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("API key"));
    }

    #[test]
    fn local_failures_are_not_remote() {
        assert!(!GleanError::NoContentFound.is_remote());
        assert!(!GleanError::MissingCredential.is_remote());
        assert!(GleanError::Network("refused".into()).is_remote());
    }
}
