use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::InventoryError;

/// Error body returned by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl InventoryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InventoryError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            InventoryError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            InventoryError::StaleVersion { .. } => StatusCode::PRECONDITION_FAILED,
            InventoryError::MalformedDocument(..) | InventoryError::StoreIo(..) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            InventoryError::Notification(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            InventoryError::InvalidPayload(_) => "invalid_payload",
            InventoryError::ItemNotFound(_) => "item_not_found",
            InventoryError::StaleVersion { .. } => "stale_version",
            InventoryError::MalformedDocument(..) => "malformed_document",
            InventoryError::StoreIo(..) => "store_io",
            InventoryError::Notification(_) => "notification_failed",
        }
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        if self.is_caller_error() {
            tracing::debug!(error = %self, "Rejected request");
        } else {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
