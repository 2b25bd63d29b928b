//! Insertion position for new records of an ordered kind.
//!
//! TRADE-OFFS
//! ==========
//! A new record goes to `count(existing)`, not `max + 1` and not the first
//! gap. Deleting and re-adding therefore produces duplicate positions, which
//! the list sort breaks by creation time. Two creates racing on the same
//! kind can both read the same count; with one operator editing a few dozen
//! items that is accepted.

use crate::content::EntityKind;
use crate::db::{ContentStore, StoreError};

/// Position for a record appended after `existing` records.
#[must_use]
pub fn next_display_order(existing: i64) -> i32 {
    i32::try_from(existing.max(0)).unwrap_or(i32::MAX)
}

/// Count the rows of `kind` and return the append position.
///
/// # Errors
///
/// Returns the store error if the count fails.
pub async fn assign_display_order(store: &dyn ContentStore, kind: EntityKind) -> Result<i32, StoreError> {
    let existing = store.count(kind).await?;
    let order = next_display_order(existing);
    tracing::debug!(%kind, existing, order, "assigned display order");
    Ok(order)
}

#[cfg(test)]
#[path = "ordering_test.rs"]
mod tests;
