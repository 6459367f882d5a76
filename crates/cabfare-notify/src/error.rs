//! # Notify Error Types
//!
//! Error types for push delivery.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Notify Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transient     │  │     Permanent           │ │
//! │  │                 │  │   (retried)     │  │     (not retried)       │ │
//! │  │  InvalidConfig  │  │  Network        │  │  InvalidMessage  (400)  │ │
//! │  │  ConfigLoad     │  │  Timeout        │  │  Unauthorized (401/403) │ │
//! │  │  InvalidToken   │  │  RateLimited    │  │  Unregistered    (404)  │ │
//! │  │  NoDeviceToken  │  │  Server (5xx)   │  │  Api (other)            │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for notify operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Push delivery failures.
#[derive(Debug, Error)]
pub enum NotifyError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid notifier configuration.
    #[error("Invalid notify configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// A device token is empty or malformed.
    #[error("Invalid device token: {0}")]
    InvalidToken(String),

    /// No device token is registered for the recipient.
    #[error("No device token registered for recipient '{recipient}'")]
    NoDeviceToken { recipient: String },

    /// The access token source failed.
    #[error("Failed to obtain access token: {0}")]
    AccessToken(String),

    // =========================================================================
    // Transient Errors
    // =========================================================================
    /// Connection-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request to FCM timed out")]
    Timeout,

    /// FCM is throttling us.
    #[error("Rate limited by FCM")]
    RateLimited { retry_after_secs: Option<u64> },

    /// FCM returned a 5xx.
    #[error("FCM server error {status}: {message}")]
    Server { status: u16, message: String },

    // =========================================================================
    // Permanent Errors
    // =========================================================================
    /// FCM rejected the message as malformed.
    #[error("Message rejected: {0}")]
    InvalidMessage(String),

    /// The access token was rejected.
    #[error("Unauthorized: access token rejected by FCM")]
    Unauthorized,

    /// The device token is no longer valid (app uninstalled, token rotated).
    #[error("Device token is no longer registered")]
    Unregistered,

    /// Any other non-success response.
    #[error("FCM API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to encode or decode a payload.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NotifyError::Timeout
        } else {
            NotifyError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        NotifyError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for NotifyError {
    fn from(err: std::io::Error) -> Self {
        NotifyError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for NotifyError {
    fn from(err: toml::de::Error) -> Self {
        NotifyError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl NotifyError {
    /// Returns true if the send can be retried.
    ///
    /// ## Retryable Errors
    /// - Network failures and timeouts
    /// - 429 rate limiting
    /// - 5xx server errors
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NotifyError::Network(_)
                | NotifyError::Timeout
                | NotifyError::RateLimited { .. }
                | NotifyError::Server { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            NotifyError::InvalidConfig(_)
                | NotifyError::ConfigLoadFailed(_)
                | NotifyError::AccessToken(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(NotifyError::Network("connection reset".into()).is_retryable());
        assert!(NotifyError::Timeout.is_retryable());
        assert!(NotifyError::RateLimited {
            retry_after_secs: Some(5)
        }
        .is_retryable());
        assert!(NotifyError::Server {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());

        assert!(!NotifyError::Unauthorized.is_retryable());
        assert!(!NotifyError::Unregistered.is_retryable());
        assert!(!NotifyError::InvalidMessage("bad".into()).is_retryable());
        assert!(!NotifyError::InvalidConfig("no project".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = NotifyError::NoDeviceToken {
            recipient: "rider-42".into(),
        };
        assert_eq!(
            err.to_string(),
            "No device token registered for recipient 'rider-42'"
        );
        assert!(NotifyError::InvalidConfig("x".into()).is_config_error());
    }
}
