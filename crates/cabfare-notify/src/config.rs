//! # Notifier Configuration
//!
//! ## Load Order (later overrides earlier)
//! 1. Default values
//! 2. Config file (`notify.toml`, or a `[notify]` table in the caller's file)
//! 3. Environment variables
//!
//! ## Example File
//! ```toml
//! project_id = "cabfare-prod"
//! endpoint = "https://fcm.googleapis.com"
//! timeout_secs = 10
//! max_retries = 3
//! initial_backoff_ms = 500
//! max_backoff_ms = 10000
//! ```
//!
//! The access token is never read from the file; it comes from
//! `CABFARE_FCM_ACCESS_TOKEN` or a caller-supplied `TokenSource`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{NotifyError, NotifyResult};

/// Production FCM base URL.
pub const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Push notifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Firebase project id.
    #[serde(default)]
    pub project_id: String,

    /// FCM base URL; tests point this at a local server.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First retry delay in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Longest retry delay in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Pre-minted OAuth access token (env only).
    #[serde(skip)]
    pub access_token: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for NotifyConfig {
    fn default() -> Self {
        NotifyConfig {
            project_id: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            access_token: None,
        }
    }
}

impl NotifyConfig {
    /// Creates a config for a project with default settings.
    pub fn new(project_id: impl Into<String>) -> Self {
        NotifyConfig {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    /// Set a custom endpoint (for testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Loads from an optional file, applies env overrides, validates.
    pub fn load(config_path: Option<&Path>) -> NotifyResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path {
            if path.exists() {
                info!(?path, "Loading notify config from file");
                let contents = std::fs::read_to_string(path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Notify config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> NotifyResult<()> {
        if self.project_id.trim().is_empty() {
            return Err(NotifyError::InvalidConfig(
                "project_id is required (set CABFARE_FCM_PROJECT_ID)".into(),
            ));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(NotifyError::InvalidConfig(format!(
                "endpoint must start with http:// or https://, got: {}",
                self.endpoint
            )));
        }

        if self.timeout_secs == 0 {
            return Err(NotifyError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(NotifyError::InvalidConfig(
                "initial_backoff_ms must not exceed max_backoff_ms".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(project) = std::env::var("CABFARE_FCM_PROJECT_ID") {
            debug!(project_id = %project, "Overriding FCM project from environment");
            self.project_id = project;
        }

        if let Ok(endpoint) = std::env::var("CABFARE_FCM_ENDPOINT") {
            debug!(endpoint = %endpoint, "Overriding FCM endpoint from environment");
            self.endpoint = endpoint;
        }

        if let Ok(token) = std::env::var("CABFARE_FCM_ACCESS_TOKEN") {
            if !token.trim().is_empty() {
                self.access_token = Some(token.trim().to_string());
            }
        }
    }

    /// The `messages:send` URL for this project.
    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint.trim_end_matches('/'),
            self.project_id
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: NotifyConfig = toml::from_str(r#"project_id = "cabfare-dev""#).unwrap();

        assert_eq!(config.project_id, "cabfare-dev");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_send_url() {
        let config = NotifyConfig::new("cabfare-dev").with_endpoint("http://localhost:9099/");
        assert_eq!(
            config.send_url(),
            "http://localhost:9099/v1/projects/cabfare-dev/messages:send"
        );
    }

    #[test]
    fn test_validation() {
        assert!(NotifyConfig::default().validate().is_err());
        assert!(NotifyConfig::new("p")
            .with_endpoint("ftp://example.com")
            .validate()
            .is_err());

        let mut config = NotifyConfig::new("p");
        config.initial_backoff_ms = 20_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_access_token_never_serialized() {
        let mut config = NotifyConfig::new("p");
        config.access_token = Some("secret".into());
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "project_id = \"from-file\"\nmax_retries = 5").unwrap();

        let config = NotifyConfig::load(Some(file.path()));
        // A CABFARE_FCM_PROJECT_ID in the test environment would win.
        if std::env::var("CABFARE_FCM_PROJECT_ID").is_err() {
            let config = config.unwrap();
            assert_eq!(config.project_id, "from-file");
            assert_eq!(config.max_retries, 5);
        }
    }
}
