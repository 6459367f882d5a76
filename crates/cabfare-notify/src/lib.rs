//! # cabfare-notify: Push Notifications for Cabfare
//!
//! A thin wrapper around Firebase Cloud Messaging (HTTP v1) that delivers
//! background notifications with a title, a body and an opaque data payload.
//!
//! ## Modules
//!
//! - [`client`] - `Notifier`, the `PushTransport` seam and the reqwest transport
//! - [`auth`] - Access token cache with early refresh
//! - [`registry`] - Recipient → device token table
//! - [`message`] - `PushNotification` and the FCM envelope
//! - [`config`] - `NotifyConfig` (file + env)
//! - [`error`] - `NotifyError` with retry categorisation
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use cabfare_notify::{DeviceRegistry, DeviceToken, Notifier, NotifyConfig, PushNotification, StaticTokenSource};
//!
//! # async fn run() -> cabfare_notify::NotifyResult<()> {
//! let config = NotifyConfig::load(None)?;
//! let source = StaticTokenSource::new(config.access_token.clone().unwrap_or_default());
//! let notifier = Notifier::from_config(&config, source, Arc::new(DeviceRegistry::new()))?;
//!
//! let token = DeviceToken::parse("fcm-registration-token")?;
//! notifier
//!     .deliver(&token, &PushNotification::new("Driver assigned", "Arriving in 5 min"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod registry;

pub use auth::{AccessToken, AccessTokenCache, StaticTokenSource, TokenSource};
pub use client::{FcmTransport, Notifier, PushTransport, RetryPolicy};
pub use config::NotifyConfig;
pub use error::{NotifyError, NotifyResult};
pub use message::{DeviceToken, PushNotification, SendReceipt};
pub use registry::DeviceRegistry;
