//! File-backed persistence: the inventory document and the summary log.

mod lock;
pub mod schema;
mod storage;
mod summary_log;

pub use schema::{denormalize, normalize, Metadata, NormalizedDocument, SchemaError, Shape};
pub use storage::{Fallback, InventoryStore, StoredVersion};
pub use summary_log::SummaryLog;
