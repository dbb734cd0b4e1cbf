use std::fmt;

use crate::error::InventoryError;
use crate::events::{EventSender, InventoryEvent};
use crate::inventory::InventoryService;
use crate::store::SummaryLog;
use crate::summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Zero every reorder quantity.
    Reset,
    /// Snapshot the inventory into the summary log.
    Summary,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Reset => write!(f, "reset"),
            JobKind::Summary => write!(f, "summary"),
        }
    }
}

/// Runs the daily jobs against the shared inventory.
#[derive(Clone)]
pub struct JobRunner {
    service: InventoryService,
    log: SummaryLog,
    events: EventSender,
}

impl JobRunner {
    pub fn new(service: InventoryService, log: SummaryLog) -> Self {
        let events = service.events().clone();
        Self {
            service,
            log,
            events,
        }
    }

    pub fn log(&self) -> &SummaryLog {
        &self.log
    }

    /// Runs one job and returns the event it produced without publishing it.
    pub async fn run(&self, kind: JobKind) -> Result<InventoryEvent, InventoryError> {
        match kind {
            JobKind::Reset => {
                let outcome = self.service.reset_reorder_quantities().await?;
                tracing::info!(
                    ingredients = outcome.ingredients,
                    changed = outcome.changed,
                    "Reorder quantities reset"
                );
                Ok(InventoryEvent::Reset {
                    at: self.service.now(),
                    ingredients: outcome.ingredients,
                })
            }
            JobKind::Summary => {
                let (categories, _) = self.service.snapshot().await?;
                let entry = summary::aggregate(&categories, self.service.now());
                let total = self.log.append(&entry)?;
                tracing::info!(items = entry.items.len(), entries = total, "Daily summary recorded");
                Ok(InventoryEvent::Summarized { entry })
            }
        }
    }

    /// Runs one job and publishes its event. Failures abort this firing only.
    pub async fn fire(&self, kind: JobKind) {
        match self.run(kind).await {
            Ok(event) => self.events.emit(event),
            Err(e) => tracing::warn!(job = %kind, error = %e, "Scheduled job failed; skipping"),
        }
    }
}
