//! Inventory update service: delta updates, full saves and the reset transform.

mod payload;
mod service;
pub mod transform;

pub use payload::SavePayload;
pub use service::{DeltaOutcome, InventoryService};
pub use transform::ResetOutcome;
