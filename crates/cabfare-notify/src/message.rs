//! # Push Messages
//!
//! The notification we want to deliver, and the FCM HTTP v1 envelope it is
//! sent in.
//!
//! ## Wire Shape
//! ```text
//! POST /v1/projects/{project}/messages:send
//! {
//!   "message": {
//!     "token": "<device token>",
//!     "notification": { "title": "...", "body": "..." },
//!     "data": { "notification_id": "<uuid>", "kind": "fare_quote", ... },
//!     "android": { "priority": "high" },
//!     "apns": {
//!       "headers": { "apns-priority": "10" },
//!       "payload": { "aps": { "content-available": 1 } }
//!     }
//!   }
//! }
//! ```
//!
//! FCM only accepts string values in `data`, so the payload is a string map.

use std::collections::BTreeMap;
use std::fmt;

use cabfare_core::FareBreakdown;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{NotifyError, NotifyResult};

// =============================================================================
// Device Token
// =============================================================================

/// An FCM registration token identifying one app install.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceToken(String);

impl DeviceToken {
    /// Parses a registration token.
    ///
    /// ## Rules
    /// - Must not be empty
    /// - Must not contain whitespace
    pub fn parse(token: &str) -> NotifyResult<Self> {
        let token = token.trim();

        if token.is_empty() {
            return Err(NotifyError::InvalidToken("token is empty".into()));
        }

        if token.chars().any(char::is_whitespace) {
            return Err(NotifyError::InvalidToken(
                "token must not contain whitespace".into(),
            ));
        }

        Ok(DeviceToken(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for logs.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("{}…", prefix)
    }
}

// Tokens are credentials for a device; keep them out of debug output.
impl fmt::Debug for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceToken({})", self.redacted())
    }
}

// =============================================================================
// Push Notification
// =============================================================================

/// A background notification: title, body and an opaque string payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNotification {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl PushNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        PushNotification {
            id: Uuid::new_v4(),
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a payload entry.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// A fare estimate notification for a priced trip.
    pub fn fare_quote(fare: &FareBreakdown) -> Self {
        let service = fare.service_type.as_str().replace('_', " ");
        PushNotification::new(
            "Your fare estimate",
            format!("Estimated {} fare: {}", service, fare.total),
        )
        .with_data("kind", "fare_quote")
        .with_data("service_type", fare.service_type.as_str())
        .with_data("total_paise", fare.total.paise().to_string())
    }

    /// Checks the fields FCM requires.
    pub fn validate(&self) -> NotifyResult<()> {
        if self.title.trim().is_empty() {
            return Err(NotifyError::InvalidMessage("title is required".into()));
        }
        if self.data.contains_key(NOTIFICATION_ID_KEY) {
            return Err(NotifyError::InvalidMessage(format!(
                "data key '{}' is reserved",
                NOTIFICATION_ID_KEY
            )));
        }
        Ok(())
    }

    /// Wraps this notification in an FCM v1 send request.
    pub fn to_fcm_request(&self, token: &DeviceToken) -> FcmRequest {
        let mut data = self.data.clone();
        data.insert(NOTIFICATION_ID_KEY.to_string(), self.id.to_string());
        data.insert("sent_at".to_string(), self.created_at.to_rfc3339());

        FcmRequest {
            message: FcmMessage {
                token: token.as_str().to_string(),
                notification: FcmNotification {
                    title: self.title.clone(),
                    body: self.body.clone(),
                },
                data,
                android: AndroidConfig {
                    priority: "high".to_string(),
                },
                apns: ApnsConfig {
                    headers: BTreeMap::from([("apns-priority".to_string(), "10".to_string())]),
                    payload: ApnsPayload {
                        aps: Aps {
                            content_available: 1,
                        },
                    },
                },
            },
        }
    }
}

/// Data key carrying the notification id, so the app can de-duplicate.
pub const NOTIFICATION_ID_KEY: &str = "notification_id";

// =============================================================================
// FCM HTTP v1 Envelope
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcmRequest {
    pub message: FcmMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcmMessage {
    pub token: String,
    pub notification: FcmNotification,
    pub data: BTreeMap<String, String>,
    pub android: AndroidConfig,
    pub apns: ApnsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AndroidConfig {
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsConfig {
    pub headers: BTreeMap<String, String>,
    pub payload: ApnsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aps {
    #[serde(rename = "content-available")]
    pub content_available: u8,
}

/// Successful send response: `{"name": "projects/p/messages/123"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub name: String,
}

/// FCM error body, as much of it as we read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FcmErrorBody {
    #[serde(default)]
    pub error: FcmErrorStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FcmErrorStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FcmErrorDetail {
    #[serde(rename = "errorCode", default)]
    pub error_code: Option<String>,
}

impl FcmErrorBody {
    /// True when FCM reports the device token as gone.
    pub fn is_unregistered(&self) -> bool {
        self.error
            .details
            .iter()
            .any(|d| d.error_code.as_deref() == Some("UNREGISTERED"))
    }
}
