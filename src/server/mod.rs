//! HTTP surface for the inventory: reads, saves, delta updates and pushes.
//!
//! # Endpoints
//!
//! - `GET /health`: status, version and the state of each scheduled job
//! - `GET /data.json`, `GET /api/ingredients`: canonical category list with an `ETag`
//! - `POST /save?username=`: replace the whole inventory, honoring `If-Match`
//! - `POST /api/update`: `{name, amount}` adds `amount` to one ingredient
//! - `POST /push`: `{messages}` forwarded to the group chat
//! - anything else: files from the dashboard directory

mod error;
mod handlers;

pub use error::ErrorBody;

use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::inventory::InventoryService;
use crate::notify::Notifier;
use crate::scheduler::{JobHandle, JobKind, JobState};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: InventoryService,
    pub notifier: Arc<dyn Notifier>,
    pub jobs: Arc<Vec<(JobKind, watch::Receiver<JobState>)>>,
}

impl AppState {
    pub fn new(service: InventoryService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            jobs: Arc::new(Vec::new()),
        }
    }

    /// Reports the state of these jobs from `/health`.
    pub fn with_jobs(mut self, handles: &[JobHandle]) -> Self {
        self.jobs = Arc::new(
            handles
                .iter()
                .map(|h| (h.kind, h.state.clone()))
                .collect(),
        );
        self
    }
}

pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/data.json", get(handlers::get_inventory))
        .route("/api/ingredients", get(handlers::get_inventory))
        .route("/save", post(handlers::save))
        .route("/api/update", post(handlers::update))
        .route("/push", post(handlers::push))
        .with_state(state);

    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use crate::store::{InventoryStore, StoredVersion};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestContext {
        app: Router,
        notifier: Arc<RecordingNotifier>,
        data_path: std::path::PathBuf,
        _temp_dir: TempDir,
    }

    fn setup_with(contents: Option<Value>, notifier: RecordingNotifier) -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let data_path = temp_dir.path().join("data.json");
        if let Some(contents) = contents {
            fs::write(&data_path, serde_json::to_vec_pretty(&contents).unwrap()).unwrap();
        }
        let static_dir = temp_dir.path().join("public");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("index.html"), "<h1>stock</h1>").unwrap();

        let notifier = Arc::new(notifier);
        let service =
            InventoryService::new(InventoryStore::new(&data_path), chrono_tz::Asia::Bangkok);
        let state = AppState::new(service, notifier.clone());

        TestContext {
            app: router(state, Some(&static_dir)),
            notifier,
            data_path,
            _temp_dir: temp_dir,
        }
    }

    fn setup(contents: Option<Value>) -> TestContext {
        setup_with(contents, RecordingNotifier::default())
    }

    fn produce() -> Value {
        json!([{ "name": "Produce", "ingredients": [
            { "name": "Onion", "unit": "kg", "remaining": 5, "used": 2, "to_buy": 3 }
        ]}])
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn on_disk(ctx: &TestContext) -> Value {
        serde_json::from_slice(&fs::read(&ctx.data_path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let ctx = setup(None);
        let response = ctx.app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
    }

    #[tokio::test]
    async fn test_get_inventory_normalizes_flat_list() {
        let ctx = setup(Some(json!([{ "name": "Onion", "remaining": 5 }])));

        let response = ctx.app.oneshot(get("/api/ingredients")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::ETAG));

        let body = body_json(response).await;
        assert_eq!(body[0]["ingredients"][0]["name"], json!("Onion"));
        assert_eq!(body[0]["ingredients"][0]["remaining"], json!(5.0));
    }

    #[tokio::test]
    async fn test_get_data_json_unwraps() {
        let ctx = setup(Some(json!({ "username": "Nit", "data": produce() })));

        let response = ctx.app.oneshot(get("/data.json")).await.unwrap();
        let body = body_json(response).await;
        assert!(body.is_array());
        assert_eq!(body[0]["name"], json!("Produce"));
    }

    #[tokio::test]
    async fn test_get_inventory_missing_file() {
        let ctx = setup(None);
        let response = ctx.app.oneshot(get("/data.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], json!("store_io"));
    }

    #[tokio::test]
    async fn test_save_with_username() {
        let ctx = setup(Some(produce()));

        let response = ctx
            .app
            .clone()
            .oneshot(post_json("/save?username=Ploy", &produce()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));

        let value = on_disk(&ctx);
        assert_eq!(value["username"], json!("Ploy"));
        assert_eq!(value["data"][0]["ingredients"][0]["name"], json!("Onion"));
    }

    #[tokio::test]
    async fn test_save_creates_missing_document() {
        let ctx = setup(None);

        let response = ctx.app.clone().oneshot(post_json("/save", &produce())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(on_disk(&ctx)["data"][0]["name"], json!("Produce"));
    }

    #[tokio::test]
    async fn test_save_invalid_payload() {
        let ctx = setup(Some(produce()));
        let before = fs::read(&ctx.data_path).unwrap();

        let response = ctx
            .app
            .clone()
            .oneshot(post_json("/save", &json!({ "username": "Nit" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], json!("invalid_payload"));
        assert_eq!(fs::read(&ctx.data_path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_save_with_current_etag() {
        let ctx = setup(Some(produce()));

        let response = ctx.app.clone().oneshot(get("/data.json")).await.unwrap();
        let etag = response.headers()[header::ETAG].to_str().unwrap().to_string();

        let mut request = post_json("/save", &produce());
        request
            .headers_mut()
            .insert(header::IF_MATCH, etag.parse().unwrap());
        let response = ctx.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_save_with_stale_etag() {
        let ctx = setup(Some(produce()));

        let mut request = post_json("/save", &produce());
        request
            .headers_mut()
            .insert(header::IF_MATCH, "\"0000\"".parse().unwrap());
        let response = ctx.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(body_json(response).await["error"], json!("stale_version"));
    }

    #[tokio::test]
    async fn test_save_if_match_on_missing_document() {
        let ctx = setup(None);

        let mut request = post_json("/save", &produce());
        request
            .headers_mut()
            .insert(header::IF_MATCH, "\"abc\"".parse().unwrap());
        let response = ctx.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        assert!(!ctx.data_path.exists());

        let missing = format!("\"{}\"", StoredVersion::missing());
        let mut request = post_json("/save", &produce());
        request
            .headers_mut()
            .insert(header::IF_MATCH, missing.parse().unwrap());
        let response = ctx.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(on_disk(&ctx)["data"][0]["name"], json!("Produce"));
    }

    #[tokio::test]
    async fn test_save_replaces_unreadable_document() {
        let ctx = setup(None);
        fs::write(&ctx.data_path, "{ truncated").unwrap();

        let response = ctx.app.clone().oneshot(get("/data.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ctx.app.clone().oneshot(post_json("/save", &produce())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = ctx.app.clone().oneshot(get("/data.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await[0]["name"], json!("Produce"));
    }

    #[tokio::test]
    async fn test_update_applies_delta() {
        let ctx = setup(Some(produce()));

        let response = ctx
            .app
            .clone()
            .oneshot(post_json("/api/update", &json!({ "name": "Onion", "amount": -2 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["remaining"], json!(3.0));
    }

    #[tokio::test]
    async fn test_update_unknown_item() {
        let ctx = setup(Some(produce()));

        let response = ctx
            .app
            .clone()
            .oneshot(post_json("/api/update", &json!({ "name": "Garlic", "amount": 1 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], json!("item_not_found"));
    }

    #[tokio::test]
    async fn test_update_bad_body() {
        let ctx = setup(Some(produce()));

        let response = ctx
            .app
            .clone()
            .oneshot(post_json("/api/update", &json!({ "name": "Onion" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_push_forwards_messages() {
        let ctx = setup(None);
        let message = json!({ "type": "text", "text": "hello" });

        let response = ctx
            .app
            .clone()
            .oneshot(post_json("/push", &json!({ "messages": [message.clone()] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.notifier.pushed(), vec![message]);
    }

    #[tokio::test]
    async fn test_push_without_messages() {
        let ctx = setup(None);

        for body in [json!({}), json!({ "messages": [] })] {
            let response = ctx.app.clone().oneshot(post_json("/push", &body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert!(ctx.notifier.pushed().is_empty());
    }

    #[tokio::test]
    async fn test_push_failure_is_bad_gateway() {
        let ctx = setup_with(None, RecordingNotifier::failing());

        let response = ctx
            .app
            .clone()
            .oneshot(post_json(
                "/push",
                &json!({ "messages": [{ "type": "text", "text": "hello" }] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"], json!("notification_failed"));
    }

    #[tokio::test]
    async fn test_static_fallback() {
        let ctx = setup(None);

        let response = ctx.app.clone().oneshot(get("/index.html")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = ctx.app.oneshot(get("/missing.css")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
