use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use std::io;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task;

use super::transform::{self, ResetOutcome};
use crate::error::InventoryError;
use crate::events::{EventSender, InventoryEvent, UNKNOWN_ACTOR};
use crate::models::Category;
use crate::store::{Fallback, InventoryStore, Shape, StoredVersion};

/// Result of a delta update.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaOutcome {
    pub name: String,
    pub remaining: f64,
    pub version: StoredVersion,
}

/// Applies every change to the inventory document.
///
/// All operations on one service share a single writer lock, so HTTP saves,
/// delta updates and scheduled jobs never interleave their read-modify-write
/// cycles. The store's file lock extends that to other processes.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<Mutex<InventoryStore>>,
    tz: Tz,
    events: EventSender,
}

impl InventoryService {
    pub fn new(store: InventoryStore, tz: Tz) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            tz,
            events: EventSender::disconnected(),
        }
    }

    /// Publishes save events to `events`.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventSender {
        &self.events
    }

    /// Current time in the deployment's timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.tz).fixed_offset()
    }

    /// Canonical categories and the version they were read at.
    pub async fn snapshot(&self) -> Result<(Vec<Category>, StoredVersion), InventoryError> {
        let (doc, version) = self.with_store(|store| store.read()).await?;
        Ok((doc.categories, version))
    }

    /// Adds `delta` to the named ingredient's `remaining`.
    pub async fn apply_delta(&self, name: &str, delta: f64) -> Result<DeltaOutcome, InventoryError> {
        let item = name.to_string();
        let (remaining, version) = self
            .with_store(move |store| {
                store.update(None, Fallback::Fail, |doc| {
                    transform::apply_delta(&mut doc.categories, &item, delta)
                })
            })
            .await?;

        tracing::info!(item = name, delta, remaining, "Applied delta");

        Ok(DeltaOutcome {
            name: name.to_string(),
            remaining,
            version,
        })
    }

    /// Replaces the whole category list.
    ///
    /// The result is always written wrapped. The wrapper's other keys are
    /// kept and `username` is only overwritten by `actor`. An unreadable
    /// document is moved aside and replaced.
    pub async fn replace_all(
        &self,
        categories: Vec<Category>,
        actor: Option<String>,
        expected: Option<&StoredVersion>,
    ) -> Result<StoredVersion, InventoryError> {
        transform::validate(&categories)?;

        let expected = expected.cloned();
        let username = actor.clone();
        let ((), version) = self
            .with_store(move |store| {
                store.update(expected.as_ref(), Fallback::Replace, |doc| {
                    doc.categories = categories;
                    doc.shape = Shape::Wrapped;
                    if let Some(username) = username {
                        doc.metadata
                            .insert("username".to_string(), Value::String(username));
                    }
                    Ok(())
                })
            })
            .await?;

        let actor = actor.unwrap_or_else(|| UNKNOWN_ACTOR.to_string());
        tracing::info!(actor = %actor, version = %version, "Inventory replaced");
        self.events.emit(InventoryEvent::Saved {
            actor,
            at: self.now(),
        });

        Ok(version)
    }

    /// Sets every ingredient's `to_buy` to zero, keeping the document's shape.
    pub async fn reset_reorder_quantities(&self) -> Result<ResetOutcome, InventoryError> {
        let (outcome, _) = self
            .with_store(|store| {
                store.update(None, Fallback::Fail, |doc| {
                    Ok(transform::reset_reorder_quantities(&mut doc.categories))
                })
            })
            .await?;
        Ok(outcome)
    }

    /// Runs `op` on the blocking pool while holding the writer lock, so file
    /// locking and fsync never stall the async workers.
    async fn with_store<T, F>(&self, op: F) -> Result<T, InventoryError>
    where
        F: FnOnce(&InventoryStore) -> Result<T, InventoryError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.lock().await;
        let worker = store.clone();
        task::spawn_blocking(move || op(&worker))
            .await
            .map_err(|e| {
                InventoryError::StoreIo(
                    store.path().to_path_buf(),
                    io::Error::other(format!("store task failed: {}", e)),
                )
            })?
    }
}
