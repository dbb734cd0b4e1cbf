mod inventory;
mod summary;

pub use inventory::{Category, Ingredient};
pub use summary::{LogRecord, SummaryEntry, SummaryItem};
