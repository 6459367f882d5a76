//! # Device Registry
//!
//! Maps recipients (rider or driver ids) to their current FCM device token.
//!
//! Apps rotate their registration token from time to time and report the
//! new one; `refresh` replaces the stale token. When FCM says a token is
//! unregistered, the notifier evicts it here so we stop sending to it.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::message::DeviceToken;

/// In-memory recipient → device token table.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    tokens: RwLock<HashMap<String, DeviceToken>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a recipient's token, returning the one it replaced.
    pub async fn register(&self, recipient: &str, token: DeviceToken) -> Option<DeviceToken> {
        debug!(recipient, token = %token.redacted(), "Registering device token");
        self.tokens.write().await.insert(recipient.to_string(), token)
    }

    /// Replaces a recipient's token after the app reports a new one.
    ///
    /// Returns true when the token actually changed.
    pub async fn refresh(&self, recipient: &str, token: DeviceToken) -> bool {
        let mut tokens = self.tokens.write().await;
        match tokens.get(recipient) {
            Some(current) if *current == token => false,
            _ => {
                info!(recipient, token = %token.redacted(), "Device token refreshed");
                tokens.insert(recipient.to_string(), token);
                true
            }
        }
    }

    pub async fn token_for(&self, recipient: &str) -> Option<DeviceToken> {
        self.tokens.read().await.get(recipient).cloned()
    }

    /// Removes every registration holding this token. Returns how many.
    pub async fn evict(&self, token: &DeviceToken) -> usize {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t != token);
        let removed = before - tokens.len();
        if removed > 0 {
            info!(token = %token.redacted(), removed, "Evicted unregistered device token");
        }
        removed
    }

    pub async fn unregister(&self, recipient: &str) -> Option<DeviceToken> {
        self.tokens.write().await.remove(recipient)
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(s: &str) -> DeviceToken {
        DeviceToken::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let registry = DeviceRegistry::new();
        assert!(registry.register("rider-1", token("aaa")).await.is_none());

        assert_eq!(registry.token_for("rider-1").await, Some(token("aaa")));
        assert_eq!(registry.token_for("rider-2").await, None);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_refresh_replaces_stale_token() {
        let registry = DeviceRegistry::new();
        registry.register("rider-1", token("old")).await;

        assert!(registry.refresh("rider-1", token("new")).await);
        assert!(!registry.refresh("rider-1", token("new")).await);
        assert_eq!(registry.token_for("rider-1").await, Some(token("new")));
    }

    #[tokio::test]
    async fn test_evict_removes_all_holders() {
        let registry = DeviceRegistry::new();
        registry.register("rider-1", token("shared")).await;
        registry.register("rider-2", token("shared")).await;
        registry.register("rider-3", token("other")).await;

        assert_eq!(registry.evict(&token("shared")).await, 2);
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.evict(&token("shared")).await, 0);
    }

    #[tokio::test]
    async fn test_unregister() {
        let registry = DeviceRegistry::new();
        registry.register("rider-1", token("aaa")).await;
        assert_eq!(registry.unregister("rider-1").await, Some(token("aaa")));
        assert!(registry.is_empty().await);
    }
}
