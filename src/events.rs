//! Events raised by inventory changes and scheduled jobs.
//!
//! Producers only publish; rendering and delivering a notification happens
//! in the dispatcher, so a slow or failing chat channel never holds up a
//! write.

use chrono::{DateTime, FixedOffset};
use tokio::sync::mpsc;

use crate::models::SummaryEntry;

/// Name used when a save does not say who made it.
pub const UNKNOWN_ACTOR: &str = "ไม่ระบุชื่อ";

#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    /// The whole document was replaced by a client.
    Saved {
        actor: String,
        at: DateTime<FixedOffset>,
    },
    /// The reset job zeroed every reorder quantity.
    Reset {
        at: DateTime<FixedOffset>,
        ingredients: usize,
    },
    /// The summary job appended an entry to the log.
    Summarized { entry: SummaryEntry },
}

impl InventoryEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InventoryEvent::Saved { .. } => "saved",
            InventoryEvent::Reset { .. } => "reset",
            InventoryEvent::Summarized { .. } => "summarized",
        }
    }
}

/// Sending half of the event channel. A sender with no channel drops events.
#[derive(Debug, Clone, Default)]
pub struct EventSender {
    tx: Option<mpsc::UnboundedSender<InventoryEvent>>,
}

impl EventSender {
    /// Creates a connected sender and its receiver.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<InventoryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sender that discards everything.
    pub fn disconnected() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: InventoryEvent) {
        match &self.tx {
            Some(tx) => {
                if let Err(e) = tx.send(event) {
                    tracing::warn!(
                        event = e.0.kind(),
                        "Notification dispatcher is gone; event dropped"
                    );
                }
            }
            None => tracing::debug!(event = event.kind(), "No dispatcher attached; event dropped"),
        }
    }
}
