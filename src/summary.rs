//! Daily summary aggregation.

use chrono::{DateTime, FixedOffset};

use crate::models::{Category, SummaryEntry, SummaryItem};

/// Flattens every ingredient of every category, in order, into one entry.
pub fn aggregate(categories: &[Category], date: DateTime<FixedOffset>) -> SummaryEntry {
    let items = categories
        .iter()
        .flat_map(|category| category.ingredients.iter())
        .map(|ingredient| SummaryItem {
            name: ingredient.name.clone(),
            unit: ingredient.unit.clone(),
            remaining: ingredient.remaining,
            used: ingredient.used,
            to_buy: ingredient.to_buy,
        })
        .collect();

    SummaryEntry { date, items }
}
