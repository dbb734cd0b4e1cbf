//! Group-chat notifications.

mod dispatch;
mod line;
mod message;
mod render;

pub use dispatch::Dispatcher;
pub use line::{LineNotifier, DEFAULT_API_BASE};
pub use message::{Bubble, FlexBox, FlexComponent, Message, UriAction};
pub use render::{Renderer, DEFAULT_DIGEST_LIMIT};

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::LineConfig;

#[derive(Debug)]
pub enum NotifyError {
    /// No access token or group id is configured.
    NotConfigured,
    Payload(String),
    Transport(String),
    Rejected { status: u16, body: String },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::NotConfigured => write!(f, "Notifications are not configured"),
            NotifyError::Payload(msg) => write!(f, "Invalid message payload: {}", msg),
            NotifyError::Transport(msg) => write!(f, "Failed to reach messaging API: {}", msg),
            NotifyError::Rejected { status, body } => {
                write!(f, "Messaging API rejected push ({}): {}", status, body)
            }
        }
    }
}

impl std::error::Error for NotifyError {}

/// Delivers messages to the configured group chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Pushes raw message objects as-is.
    async fn push(&self, messages: &[Value]) -> Result<(), NotifyError>;

    async fn send(&self, message: &Message) -> Result<(), NotifyError> {
        let value =
            serde_json::to_value(message).map_err(|e| NotifyError::Payload(e.to_string()))?;
        self.push(&[value]).await
    }
}

/// Stand-in used when credentials are missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn push(&self, _messages: &[Value]) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }
}

/// Builds the LINE notifier, or a disabled one when credentials are missing.
pub fn build_notifier(config: &LineConfig) -> Arc<dyn Notifier> {
    let (Some(token), Some(group)) = (
        config.channel_access_token.as_deref(),
        config.group_id.as_deref(),
    ) else {
        tracing::warn!("LINE credentials not set, notifications disabled");
        return Arc::new(DisabledNotifier);
    };

    match LineNotifier::new(&config.api_base, token, group) {
        Ok(notifier) => {
            tracing::info!(group_id = group, "LINE notifications enabled");
            Arc::new(notifier)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not build LINE client, notifications disabled");
            Arc::new(DisabledNotifier)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingNotifier;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_send_serializes_message() {
        let notifier = RecordingNotifier::default();
        notifier.send(&Message::text("hi")).await.unwrap();
        assert_eq!(notifier.pushed(), vec![json!({ "type": "text", "text": "hi" })]);
    }

    #[tokio::test]
    async fn test_disabled_notifier() {
        let result = DisabledNotifier.send(&Message::text("hi")).await;
        assert!(matches!(result, Err(NotifyError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_build_without_credentials_is_disabled() {
        let config = LineConfig {
            channel_access_token: Some("token".into()),
            group_id: None,
            api_base: DEFAULT_API_BASE.into(),
        };
        let notifier = build_notifier(&config);
        let result = notifier.push(&[json!({})]).await;
        assert!(matches!(result, Err(NotifyError::NotConfigured)));
    }

    #[test]
    fn test_rejected_display() {
        let err = NotifyError::Rejected {
            status: 401,
            body: "invalid token".into(),
        };
        assert_eq!(
            err.to_string(),
            "Messaging API rejected push (401): invalid token"
        );
    }
}
