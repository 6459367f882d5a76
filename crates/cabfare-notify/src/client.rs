//! # Notifier
//!
//! Delivers a [`PushNotification`] to a device, retrying transient failures.
//!
//! ## Delivery Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  deliver(token, notification)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────┐  access token  ┌──────────────┐  POST   ┌──────────────┐ │
//! │  │ Notifier │───────────────►│PushTransport │────────►│  FCM v1 API  │ │
//! │  └────┬─────┘                └──────┬───────┘         └──────────────┘ │
//! │       │                             │                                   │
//! │       │   Ok(receipt) ◄─────────────┤ 200                               │
//! │       │   retry with backoff ◄──────┤ network / timeout / 429 / 5xx     │
//! │       │   invalidate token ◄────────┤ 401 / 403                         │
//! │       │   evict from registry ◄─────┤ 404 / UNREGISTERED                │
//! │       │   give up ◄─────────────────┤ 400 / other                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use crate::auth::{AccessTokenCache, TokenSource};
use crate::config::NotifyConfig;
use crate::error::{NotifyError, NotifyResult};
use crate::message::{DeviceToken, FcmErrorBody, FcmRequest, PushNotification, SendReceipt};
use crate::registry::DeviceRegistry;

// =============================================================================
// Transport
// =============================================================================

/// Sends one FCM request. Implementations do no retrying of their own.
pub trait PushTransport: Send + Sync {
    fn send(
        &self,
        access_token: &str,
        request: &FcmRequest,
    ) -> impl Future<Output = NotifyResult<SendReceipt>> + Send;
}

/// FCM HTTP v1 over reqwest.
#[derive(Debug, Clone)]
pub struct FcmTransport {
    http: reqwest::Client,
    send_url: String,
}

impl FcmTransport {
    pub fn new(config: &NotifyConfig) -> NotifyResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(FcmTransport {
            http,
            send_url: config.send_url(),
        })
    }
}

impl PushTransport for FcmTransport {
    async fn send(&self, access_token: &str, request: &FcmRequest) -> NotifyResult<SendReceipt> {
        let response = self
            .http
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }

        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        Err(classify_failure(status, retry_after_secs, &body))
    }
}

/// Maps a non-success FCM response to an error.
pub fn classify_failure(status: StatusCode, retry_after_secs: Option<u64>, body: &str) -> NotifyError {
    let parsed: FcmErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.error.message.is_empty() {
        body.chars().take(500).collect()
    } else {
        parsed.error.message.clone()
    };

    if parsed.is_unregistered() || status == StatusCode::NOT_FOUND {
        return NotifyError::Unregistered;
    }

    match status {
        StatusCode::BAD_REQUEST => NotifyError::InvalidMessage(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NotifyError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => NotifyError::RateLimited { retry_after_secs },
        s if s.is_server_error() => NotifyError::Server {
            status: s.as_u16(),
            message,
        },
        s => NotifyError::Api {
            status: s.as_u16(),
            message,
        },
    }
}

// =============================================================================
// Retry Policy
// =============================================================================

/// How transient failures are retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &NotifyConfig) -> Self {
        RetryPolicy {
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }

    /// Creates the exponential backoff configuration.
    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&NotifyConfig::default())
    }
}

// =============================================================================
// Notifier
// =============================================================================

/// Push notification sender.
pub struct Notifier<S, T> {
    tokens: AccessTokenCache<S>,
    transport: T,
    registry: Arc<DeviceRegistry>,
    retry: RetryPolicy,
}

impl<S: TokenSource> Notifier<S, FcmTransport> {
    /// Notifier talking to the FCM endpoint in `config`.
    pub fn from_config(
        config: &NotifyConfig,
        source: S,
        registry: Arc<DeviceRegistry>,
    ) -> NotifyResult<Self> {
        Ok(Notifier::new(
            source,
            FcmTransport::new(config)?,
            registry,
            RetryPolicy::from_config(config),
        ))
    }
}

impl<S: TokenSource, T: PushTransport> Notifier<S, T> {
    pub fn new(source: S, transport: T, registry: Arc<DeviceRegistry>, retry: RetryPolicy) -> Self {
        Notifier {
            tokens: AccessTokenCache::new(source),
            transport,
            registry,
            retry,
        }
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Delivers a background notification to one device.
    pub async fn deliver(
        &self,
        token: &DeviceToken,
        notification: &PushNotification,
    ) -> NotifyResult<SendReceipt> {
        notification.validate()?;
        let request = notification.to_fcm_request(token);

        let mut backoff = self.retry.create_backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            match self.send_once(&request).await {
                Ok(receipt) => {
                    info!(
                        notification_id = %notification.id,
                        device = %token.redacted(),
                        message = %receipt.name,
                        attempt,
                        "Push notification delivered"
                    );
                    return Ok(receipt);
                }
                Err(NotifyError::Unregistered) => {
                    warn!(device = %token.redacted(), "Device token unregistered, evicting");
                    self.registry.evict(token).await;
                    return Err(NotifyError::Unregistered);
                }
                Err(NotifyError::Unauthorized) => {
                    warn!("FCM rejected access token, dropping cached token");
                    self.tokens.invalidate().await;
                    return Err(NotifyError::Unauthorized);
                }
                Err(e) if e.is_retryable() && attempt <= self.retry.max_retries => {
                    let delay = match &e {
                        NotifyError::RateLimited {
                            retry_after_secs: Some(secs),
                        } => Some(Duration::from_secs(*secs).min(self.retry.max_backoff)),
                        _ => backoff.next_backoff(),
                    };
                    let Some(delay) = delay else {
                        error!("Backoff exhausted");
                        return Err(e);
                    };
                    debug!(?delay, attempt, error = %e, "Retrying push notification");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(
                        notification_id = %notification.id,
                        attempt,
                        error = %e,
                        "Push notification failed"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Delivers to whichever device the recipient last registered.
    pub async fn notify_recipient(
        &self,
        recipient: &str,
        notification: &PushNotification,
    ) -> NotifyResult<SendReceipt> {
        let token = self
            .registry
            .token_for(recipient)
            .await
            .ok_or_else(|| NotifyError::NoDeviceToken {
                recipient: recipient.to_string(),
            })?;
        self.deliver(&token, notification).await
    }

    async fn send_once(&self, request: &FcmRequest) -> NotifyResult<SendReceipt> {
        let access_token = self.tokens.get_token().await?;
        self.transport.send(&access_token, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenSource;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and records what was sent.
    struct MockTransport {
        responses: Mutex<VecDeque<NotifyResult<SendReceipt>>>,
        sent: Mutex<Vec<(String, FcmRequest)>>,
    }

    impl MockTransport {
        fn with(responses: Vec<NotifyResult<SendReceipt>>) -> Self {
            MockTransport {
                responses: Mutex::new(responses.into()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl PushTransport for MockTransport {
        async fn send(&self, access_token: &str, request: &FcmRequest) -> NotifyResult<SendReceipt> {
            self.sent
                .lock()
                .unwrap()
                .push((access_token.to_string(), request.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(receipt()))
        }
    }

    fn receipt() -> SendReceipt {
        SendReceipt {
            name: "projects/cabfare-test/messages/1".to_string(),
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        }
    }

    fn notifier(responses: Vec<NotifyResult<SendReceipt>>) -> Notifier<StaticTokenSource, MockTransport> {
        Notifier::new(
            StaticTokenSource::new("ya29.test"),
            MockTransport::with(responses),
            Arc::new(DeviceRegistry::new()),
            fast_retry(),
        )
    }

    fn device() -> DeviceToken {
        DeviceToken::parse("device-abc").unwrap()
    }

    #[tokio::test]
    async fn test_deliver_sends_bearer_and_envelope() {
        let notifier = notifier(vec![]);
        let notification = PushNotification::new("Trip booked", "See you at 6am");

        let receipt = notifier.deliver(&device(), &notification).await.unwrap();

        assert_eq!(receipt, self::receipt());
        let sent = notifier.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ya29.test");
        assert_eq!(sent[0].1.message.token, "device-abc");
        assert_eq!(sent[0].1.message.notification.title, "Trip booked");
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let notifier = notifier(vec![
            Err(NotifyError::Server {
                status: 503,
                message: "unavailable".into(),
            }),
            Err(NotifyError::Timeout),
            Ok(receipt()),
        ]);

        let result = notifier
            .deliver(&device(), &PushNotification::new("t", "b"))
            .await;

        assert!(result.is_ok());
        assert_eq!(notifier.transport.sent_count(), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let notifier = notifier(vec![
            Err(NotifyError::Network("reset".into())),
            Err(NotifyError::Network("reset".into())),
            Err(NotifyError::Network("reset".into())),
            Err(NotifyError::Network("reset".into())),
            Err(NotifyError::Network("reset".into())),
        ]);

        let result = notifier
            .deliver(&device(), &PushNotification::new("t", "b"))
            .await;

        assert!(matches!(result, Err(NotifyError::Network(_))));
        // first attempt + max_retries
        assert_eq!(notifier.transport.sent_count(), 4);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let notifier = notifier(vec![Err(NotifyError::InvalidMessage("bad".into()))]);

        let result = notifier
            .deliver(&device(), &PushNotification::new("t", "b"))
            .await;

        assert!(matches!(result, Err(NotifyError::InvalidMessage(_))));
        assert_eq!(notifier.transport.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_token_is_evicted() {
        let notifier = notifier(vec![Err(NotifyError::Unregistered)]);
        notifier.registry().register("rider-7", device()).await;

        let result = notifier
            .notify_recipient("rider-7", &PushNotification::new("t", "b"))
            .await;

        assert!(matches!(result, Err(NotifyError::Unregistered)));
        assert!(notifier.registry().token_for("rider-7").await.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_drops_cached_token() {
        let notifier = notifier(vec![Err(NotifyError::Unauthorized)]);

        let result = notifier
            .deliver(&device(), &PushNotification::new("t", "b"))
            .await;

        assert!(matches!(result, Err(NotifyError::Unauthorized)));
        assert!(notifier.tokens.current_token().await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_recipient() {
        let notifier = notifier(vec![]);
        let result = notifier
            .notify_recipient("nobody", &PushNotification::new("t", "b"))
            .await;

        assert!(matches!(result, Err(NotifyError::NoDeviceToken { .. })));
        assert_eq!(notifier.transport.sent_count(), 0);
    }

    #[test]
    fn test_classify_failure() {
        let unregistered = r#"{"error":{"code":404,"status":"NOT_FOUND","message":"gone",
            "details":[{"errorCode":"UNREGISTERED"}]}}"#;
        assert!(matches!(
            classify_failure(StatusCode::NOT_FOUND, None, unregistered),
            NotifyError::Unregistered
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, None, "{}"),
            NotifyError::InvalidMessage(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, None, ""),
            NotifyError::Unauthorized
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, Some(7), ""),
            NotifyError::RateLimited {
                retry_after_secs: Some(7)
            }
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, None, "upstream"),
            NotifyError::Server { status: 502, .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::CONFLICT, None, ""),
            NotifyError::Api { status: 409, .. }
        ));
    }
}
