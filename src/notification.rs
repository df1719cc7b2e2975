//! Push payloads and the notifications built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::NotificationDefaults;
use crate::error::Result;

/// JSON body delivered by the push service. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PushPayload {
    /// Parses a push delivery. A missing or empty payload is an empty object.
    ///
    /// # Errors
    ///
    /// Returns an error if bytes are present but are not a JSON object
    /// matching the payload schema.
    pub fn parse(data: Option<&[u8]>) -> Result<Self> {
        match data {
            None | Some([]) => Ok(Self::default()),
            Some(bytes) => Ok(serde_json::from_slice(bytes)?),
        }
    }
}

/// Data attached to a notification and read back on click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
}

/// Display options passed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub vibrate: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NotificationData>,
    pub timestamp: DateTime<Utc>,
}

/// A notification shown by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub options: NotificationOptions,
}

impl Notification {
    /// Builds the full notification for a parsed payload. Empty strings for
    /// title and url count as absent.
    #[must_use]
    pub fn from_payload(payload: PushPayload, defaults: &NotificationDefaults) -> Self {
        let title = payload
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| defaults.title.clone());
        let url = payload
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| defaults.default_url.clone());

        Self {
            id: Uuid::new_v4(),
            title,
            options: NotificationOptions {
                body: payload.body.unwrap_or_default(),
                icon: Some(defaults.icon.clone()),
                badge: Some(defaults.badge.clone()),
                vibrate: defaults.vibrate.clone(),
                data: Some(NotificationData { url }),
                timestamp: Utc::now(),
            },
        }
    }

    /// The minimal notification shown when the full one cannot be.
    #[must_use]
    pub fn fallback(defaults: &NotificationDefaults) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: defaults.title.clone(),
            options: NotificationOptions {
                body: defaults.fallback_body.clone(),
                icon: None,
                badge: None,
                vibrate: Vec::new(),
                data: None,
                timestamp: Utc::now(),
            },
        }
    }

    /// URL a click should open, if one is attached and non-empty.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.options
            .data
            .as_ref()
            .map(|d| d.url.as_str())
            .filter(|u| !u.is_empty())
    }
}
