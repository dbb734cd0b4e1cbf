//! Shared-kitchen ingredient inventory: a single JSON document kept
//! consistent across client versions, daily reset and summary jobs, and
//! LINE group notifications.

pub mod config;
pub mod error;
pub mod events;
pub mod inventory;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod server;
pub mod store;
pub mod summary;

pub use error::InventoryError;
