use serde_json::Value;

use super::transform;
use crate::error::InventoryError;
use crate::models::Category;
use crate::store::{schema, Shape};

/// A full-document save as sent by a client: either a bare category list or
/// `{ "data": [...], "username": "..." }`.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePayload {
    pub categories: Vec<Category>,
    pub username: Option<String>,
}

impl SavePayload {
    pub fn from_json(value: Value) -> Result<Self, InventoryError> {
        let doc = schema::normalize_value(value)
            .map_err(|e| InventoryError::InvalidPayload(e.to_string()))?;

        if doc.shape == Shape::FlatList {
            return Err(InventoryError::InvalidPayload(
                "expected a list of categories, found bare ingredients".to_string(),
            ));
        }

        transform::validate(&doc.categories)?;

        let username = doc
            .username()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        Ok(Self {
            categories: doc.categories,
            username,
        })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, InventoryError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| InventoryError::InvalidPayload(format!("not valid JSON: {}", e)))?;
        Self::from_json(value)
    }
}
