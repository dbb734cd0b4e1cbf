//! Pure transforms over the category list.

use std::collections::HashSet;

use crate::error::InventoryError;
use crate::models::Category;

/// What a reset changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetOutcome {
    /// Ingredients visited.
    pub ingredients: usize,
    /// Ingredients whose `to_buy` was not already zero.
    pub changed: usize,
}

/// Adds `delta` to the `remaining` of the first ingredient named `name`,
/// scanning categories in order. Returns the new value.
pub fn apply_delta(
    categories: &mut [Category],
    name: &str,
    delta: f64,
) -> Result<f64, InventoryError> {
    if !delta.is_finite() {
        return Err(InventoryError::InvalidPayload(format!(
            "amount must be a finite number, got {}",
            delta
        )));
    }

    let ingredient = categories
        .iter_mut()
        .flat_map(|c| c.ingredients.iter_mut())
        .find(|i| i.name == name)
        .ok_or_else(|| InventoryError::ItemNotFound(name.to_string()))?;

    let remaining = ingredient.remaining + delta;
    if !remaining.is_finite() {
        return Err(InventoryError::InvalidPayload(format!(
            "adding {} to \"{}\" overflows its remaining quantity",
            delta, name
        )));
    }

    ingredient.remaining = remaining;
    Ok(remaining)
}

/// Sets every ingredient's `to_buy` to zero.
pub fn reset_reorder_quantities(categories: &mut [Category]) -> ResetOutcome {
    let mut outcome = ResetOutcome::default();
    for ingredient in categories.iter_mut().flat_map(|c| c.ingredients.iter_mut()) {
        outcome.ingredients += 1;
        if ingredient.to_buy != 0.0 {
            outcome.changed += 1;
        }
        ingredient.to_buy = 0.0;
    }
    outcome
}

/// Checks a client-supplied category list before it replaces the document.
pub fn validate(categories: &[Category]) -> Result<(), InventoryError> {
    for (ci, category) in categories.iter().enumerate() {
        let mut seen = HashSet::new();
        for ingredient in &category.ingredients {
            if ingredient.name.trim().is_empty() {
                return Err(InventoryError::InvalidPayload(format!(
                    "category #{} ({}) has an ingredient without a name",
                    ci, category.name
                )));
            }
            let quantities = [ingredient.remaining, ingredient.used, ingredient.to_buy];
            if quantities.iter().any(|n| !n.is_finite()) {
                return Err(InventoryError::InvalidPayload(format!(
                    "ingredient \"{}\" has a quantity that is not a finite number",
                    ingredient.name
                )));
            }
            if !seen.insert(ingredient.name.as_str()) {
                return Err(InventoryError::InvalidPayload(format!(
                    "ingredient \"{}\" appears twice in category \"{}\"",
                    ingredient.name, category.name
                )));
            }
        }
    }
    Ok(())
}
