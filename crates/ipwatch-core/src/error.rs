//! Error types for ipwatch
//!
//! Every variant is fatal to the current run. The poller stops on the first
//! error and the daemon decides the exit code from the variant.

use thiserror::Error;

/// Result type alias for ipwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ipwatch
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, empty or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Public IP lookup or provider transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Provider rejected the update (non-2xx status or `success: false`)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Local state file I/O failure
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Whether this error comes from configuration rather than a running check
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_names_provider() {
        let err = Error::provider("cloudflare", "status 403 Forbidden");
        assert_eq!(
            err.to_string(),
            "Provider error (cloudflare): status 403 Forbidden"
        );
        assert!(!err.is_config());
    }

    #[test]
    fn config_error_is_config() {
        assert!(Error::config("value for key \"zone-id\" is empty").is_config());
        assert!(!Error::network("empty response").is_config());
    }
}
