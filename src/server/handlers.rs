use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::AppState;
use crate::error::InventoryError;
use crate::inventory::SavePayload;
use crate::scheduler::JobState;
use crate::store::StoredVersion;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    jobs: BTreeMap<String, JobState>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let jobs = state
        .jobs
        .iter()
        .map(|(kind, rx)| (kind.to_string(), *rx.borrow()))
        .collect();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        jobs,
    })
}

fn etag(version: &StoredVersion) -> [(header::HeaderName, String); 1] {
    [(header::ETAG, format!("\"{}\"", version))]
}

/// Canonical category list, whatever shape is on disk.
pub async fn get_inventory(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, InventoryError> {
    let (categories, version) = state.service.snapshot().await?;
    Ok((etag(&version), Json(categories)))
}

#[derive(Debug, Deserialize)]
pub struct SaveQuery {
    username: Option<String>,
}

#[derive(Serialize)]
pub struct SaveResponse {
    success: bool,
    version: String,
}

/// Replaces the whole inventory. The query's `username` wins over the body's.
pub async fn save(
    State(state): State<AppState>,
    Query(query): Query<SaveQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, InventoryError> {
    let payload = SavePayload::from_slice(&body)?;
    let expected = if_match(&headers)?;

    let actor = query
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .or(payload.username);

    let version = state
        .service
        .replace_all(payload.categories, actor, expected.as_ref())
        .await?;

    Ok((
        etag(&version),
        Json(SaveResponse {
            success: true,
            version: version.to_string(),
        }),
    ))
}

fn if_match(headers: &HeaderMap) -> Result<Option<StoredVersion>, InventoryError> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| InventoryError::InvalidPayload("If-Match header is not ASCII".to_string()))?
        .trim();

    if value == "*" {
        return Ok(None);
    }
    Ok(Some(StoredVersion::parse(value)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    name: String,
    amount: f64,
}

#[derive(Serialize)]
pub struct UpdateResponse {
    success: bool,
    remaining: f64,
}

pub async fn update(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UpdateResponse>, InventoryError> {
    let request: UpdateRequest = serde_json::from_slice(&body)
        .map_err(|e| InventoryError::InvalidPayload(e.to_string()))?;

    let outcome = state.service.apply_delta(&request.name, request.amount).await?;

    Ok(Json(UpdateResponse {
        success: true,
        remaining: outcome.remaining,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PushRequest {
    messages: Option<Value>,
}

#[derive(Serialize)]
pub struct PushResponse {
    success: bool,
    sent: usize,
}

/// Forwards client-built messages to the group chat unchanged.
pub async fn push(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PushResponse>, InventoryError> {
    let request: PushRequest = serde_json::from_slice(&body)
        .map_err(|e| InventoryError::InvalidPayload(e.to_string()))?;

    let messages = match request.messages {
        Some(Value::Array(messages)) if !messages.is_empty() => messages,
        Some(message @ Value::Object(_)) => vec![message],
        _ => {
            return Err(InventoryError::InvalidPayload(
                "No messages provided".to_string(),
            ))
        }
    };

    state.notifier.push(&messages).await?;
    tracing::info!(count = messages.len(), "Pushed client messages");

    Ok(Json(PushResponse {
        success: true,
        sent: messages.len(),
    }))
}
