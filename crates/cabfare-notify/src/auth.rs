//! # FCM Access Tokens
//!
//! FCM HTTP v1 wants an OAuth2 bearer token on every send. Minting one is
//! someone else's job (a service-account exchange, `gcloud`, a metadata
//! server); this module caches whatever a [`TokenSource`] hands back and
//! asks again shortly before it expires.
//!
//! ## Refresh Flow
//! ```text
//! get_token()
//!   │
//!   ├── read lock: cached and > 5 min left? ──► return it
//!   │
//!   └── write lock
//!         ├── re-check (another task may have refreshed)
//!         └── source.fetch() ──► cache ──► return
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{NotifyError, NotifyResult};

/// Margin before token expiration to trigger refresh (5 minutes)
const REFRESH_MARGIN_SECS: u64 = 300;

/// Lifetime Google gives OAuth access tokens.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// An OAuth access token and when it stops working.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Instant,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, lifetime: Duration) -> Self {
        AccessToken {
            value: value.into(),
            expires_at: Instant::now() + lifetime,
        }
    }

    /// Check if the token is expired or about to expire
    pub fn needs_refresh(&self) -> bool {
        let margin = Duration::from_secs(REFRESH_MARGIN_SECS);
        Instant::now() + margin >= self.expires_at
    }

    /// Check if the token is completely expired (no grace period)
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn remaining_secs(&self) -> u64 {
        self.expires_at
            .saturating_duration_since(Instant::now())
            .as_secs()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("remaining_secs", &self.remaining_secs())
            .finish()
    }
}

// =============================================================================
// Token Sources
// =============================================================================

/// Something that can mint a fresh access token.
pub trait TokenSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = NotifyResult<AccessToken>> + Send;
}

/// A fixed token, e.g. from `CABFARE_FCM_ACCESS_TOKEN`.
///
/// Each fetch restamps the lifetime; once the real token expires, FCM
/// answers 401 and the send fails as `Unauthorized`.
#[derive(Clone)]
pub struct StaticTokenSource {
    token: String,
    lifetime: Duration,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        StaticTokenSource {
            token: token.into(),
            lifetime: DEFAULT_TOKEN_LIFETIME,
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }
}

impl TokenSource for StaticTokenSource {
    async fn fetch(&self) -> NotifyResult<AccessToken> {
        if self.token.trim().is_empty() {
            return Err(NotifyError::AccessToken(
                "no access token configured (set CABFARE_FCM_ACCESS_TOKEN)".into(),
            ));
        }
        Ok(AccessToken::new(self.token.clone(), self.lifetime))
    }
}

// =============================================================================
// Cache
// =============================================================================

/// Caches the access token from a source and refreshes it before expiry.
pub struct AccessTokenCache<S> {
    source: S,
    token: RwLock<Option<AccessToken>>,
}

impl<S: TokenSource> AccessTokenCache<S> {
    pub fn new(source: S) -> Self {
        AccessTokenCache {
            source,
            token: RwLock::new(None),
        }
    }

    /// Returns a token with at least the refresh margin left, fetching one
    /// if needed.
    pub async fn get_token(&self) -> NotifyResult<String> {
        {
            let guard = self.token.read().await;
            if let Some(token) = guard.as_ref() {
                if !token.needs_refresh() {
                    debug!(remaining_secs = token.remaining_secs(), "Using cached access token");
                    return Ok(token.value.clone());
                }
            }
        }

        let mut guard = self.token.write().await;

        // Double-check after acquiring write lock
        if let Some(token) = guard.as_ref() {
            if !token.needs_refresh() {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.source.fetch().await?;
        info!(expires_in_secs = fresh.remaining_secs(), "Fetched FCM access token");
        let value = fresh.value.clone();
        *guard = Some(fresh);

        Ok(value)
    }

    /// Drops the cached token so the next call fetches a new one.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    /// Current token, without triggering a refresh.
    pub async fn current_token(&self) -> Option<AccessToken> {
        self.token.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        calls: Arc<AtomicU32>,
        lifetime: Duration,
    }

    impl TokenSource for CountingSource {
        async fn fetch(&self) -> NotifyResult<AccessToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(AccessToken::new(format!("token-{}", n), self.lifetime))
        }
    }

    #[test]
    fn test_token_needs_refresh() {
        let token = AccessToken::new("t", Duration::from_secs(60));
        assert!(token.needs_refresh());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_token_no_refresh_needed() {
        let token = AccessToken::new("t", Duration::from_secs(3600));
        assert!(!token.needs_refresh());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = AccessToken::new("ya29.secret", Duration::from_secs(3600));
        assert!(!format!("{:?}", token).contains("secret"));
    }

    #[tokio::test]
    async fn test_cache_reuses_fresh_token() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache = AccessTokenCache::new(CountingSource {
            calls: calls.clone(),
            lifetime: Duration::from_secs(3600),
        });

        assert_eq!(cache.get_token().await.unwrap(), "token-1");
        assert_eq!(cache.get_token().await.unwrap(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_refreshes_inside_margin() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache = AccessTokenCache::new(CountingSource {
            calls: calls.clone(),
            lifetime: Duration::from_secs(120),
        });

        assert_eq!(cache.get_token().await.unwrap(), "token-1");
        assert_eq!(cache.get_token().await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn test_invalidate_forces_fetch() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache = AccessTokenCache::new(CountingSource {
            calls: calls.clone(),
            lifetime: Duration::from_secs(3600),
        });

        cache.get_token().await.unwrap();
        cache.invalidate().await;
        assert!(cache.current_token().await.is_none());
        assert_eq!(cache.get_token().await.unwrap(), "token-2");
    }

    #[tokio::test]
    async fn test_static_source_requires_token() {
        let cache = AccessTokenCache::new(StaticTokenSource::new("  "));
        assert!(matches!(
            cache.get_token().await,
            Err(NotifyError::AccessToken(_))
        ));
    }
}
