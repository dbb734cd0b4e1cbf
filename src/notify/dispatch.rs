use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Notifier, NotifyError, Renderer};
use crate::events::InventoryEvent;

/// Renders events and hands them to the notifier.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    renderer: Renderer,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, renderer: Renderer) -> Self {
        Self { notifier, renderer }
    }

    /// Delivers one event. Failures are logged and returned, never retried.
    pub async fn deliver(&self, event: &InventoryEvent) -> Result<(), NotifyError> {
        let message = self.renderer.render(event);
        let result = self.notifier.send(&message).await;

        match &result {
            Ok(()) => tracing::info!(event = event.kind(), "Notification sent"),
            Err(NotifyError::NotConfigured) => {
                tracing::debug!(event = event.kind(), "Notifications disabled; skipped")
            }
            Err(e) => tracing::warn!(event = event.kind(), error = %e, "Notification failed"),
        }

        result
    }

    /// Drains `rx` until every sender is dropped.
    pub fn spawn(self, mut rx: mpsc::UnboundedReceiver<InventoryEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let _ = self.deliver(&event).await;
            }
            tracing::debug!("Event channel closed; dispatcher stopped");
        })
    }
}
