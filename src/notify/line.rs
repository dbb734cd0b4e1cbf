//! LINE Messaging API push client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::{Notifier, NotifyError};

pub const DEFAULT_API_BASE: &str = "https://api.line.me";

/// LINE accepts at most this many messages per push request.
const MAX_MESSAGES_PER_PUSH: usize = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: &'a [Value],
}

/// Pushes messages to one LINE group.
#[derive(Clone)]
pub struct LineNotifier {
    client: Client,
    api_base: String,
    access_token: String,
    group_id: String,
}

impl LineNotifier {
    pub fn new(
        api_base: impl Into<String>,
        access_token: impl Into<String>,
        group_id: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            group_id: group_id.into(),
        })
    }

    fn push_url(&self) -> String {
        format!("{}/v2/bot/message/push", self.api_base)
    }
}

#[async_trait]
impl Notifier for LineNotifier {
    async fn push(&self, messages: &[Value]) -> Result<(), NotifyError> {
        for batch in messages.chunks(MAX_MESSAGES_PER_PUSH) {
            let body = PushRequest {
                to: &self.group_id,
                messages: batch,
            };

            let response = self
                .client
                .post(self.push_url())
                .bearer_auth(&self.access_token)
                .json(&body)
                .send()
                .await
                .map_err(|e| NotifyError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(NotifyError::Rejected {
                    status: status.as_u16(),
                    body,
                });
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for LineNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineNotifier")
            .field("api_base", &self.api_base)
            .field("group_id", &self.group_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn stub_push(
        State(stub): State<Stub>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> StatusCode {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        stub.seen.lock().unwrap().push((auth, body));
        stub.status
    }

    async fn spawn_stub(status: StatusCode) -> (String, Stub) {
        let stub = Stub {
            status,
            seen: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/v2/bot/message/push", post(stub_push))
            .with_state(stub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), stub)
    }

    fn texts(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| serde_json::json!({ "type": "text", "text": format!("message {}", i) }))
            .collect()
    }

    #[tokio::test]
    async fn test_push_batches_and_authenticates() {
        let (base, stub) = spawn_stub(StatusCode::OK).await;
        let notifier = LineNotifier::new(base, "token-1", "C123").unwrap();

        notifier.push(&texts(7)).await.unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0.as_deref(), Some("Bearer token-1"));
        assert_eq!(seen[0].1["to"], serde_json::json!("C123"));
        assert_eq!(seen[0].1["messages"].as_array().unwrap().len(), 5);
        assert_eq!(seen[1].1["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_push() {
        let (base, _stub) = spawn_stub(StatusCode::UNAUTHORIZED).await;
        let notifier = LineNotifier::new(base, "bad-token", "C123").unwrap();

        let result = notifier.push(&texts(1)).await;
        assert!(matches!(result, Err(NotifyError::Rejected { status: 401, .. })));
    }

    #[test]
    fn test_push_url_trims_trailing_slash() {
        let notifier = LineNotifier::new("https://api.line.me/", "token", "C123").unwrap();
        assert_eq!(notifier.push_url(), "https://api.line.me/v2/bot/message/push");
    }

    #[test]
    fn test_debug_hides_token() {
        let notifier = LineNotifier::new(DEFAULT_API_BASE, "super-secret", "C123").unwrap();
        let debug = format!("{:?}", notifier);
        assert!(debug.contains("C123"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_push_request_body() {
        let messages = vec![serde_json::json!({ "type": "text", "text": "hi" })];
        let body = PushRequest {
            to: "C123",
            messages: &messages,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({ "to": "C123", "messages": [{ "type": "text", "text": "hi" }] })
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let notifier = LineNotifier::new("http://127.0.0.1:9", "token", "C123").unwrap();
        let result = notifier
            .push(&[serde_json::json!({ "type": "text", "text": "hi" })])
            .await;
        assert!(matches!(result, Err(NotifyError::Transport(_))));
    }
}
