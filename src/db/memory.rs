//! In-process content store.
//!
//! Used by tests and by local preview runs without `DATABASE_URL`. Tables
//! are vectors in insertion order, so a stable sort on `display_order`
//! breaks ties by creation exactly like the Postgres ordering.

use std::collections::HashMap;

use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{ContentStore, Row, StoreError, format_timestamp, next_stamp, parse_timestamp, row_id};
use crate::content::EntityKind;

#[derive(Default)]
pub struct MemoryContentStore {
    tables: RwLock<HashMap<EntityKind, Vec<Row>>>,
}

impl MemoryContentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn display_order(row: &Row) -> i64 {
    row.get("display_order").and_then(serde_json::Value::as_i64).unwrap_or(0)
}

#[async_trait::async_trait]
impl ContentStore for MemoryContentStore {
    async fn select_all(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows = tables.get(&kind).cloned().unwrap_or_default();
        if kind.is_ordered() {
            rows.sort_by_key(display_order);
        }
        Ok(rows)
    }

    async fn count(&self, kind: EntityKind) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        let len = tables.get(&kind).map_or(0, Vec::len);
        i64::try_from(len).map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn insert(&self, kind: EntityKind, row: Row) -> Result<Row, StoreError> {
        if row_id(&row).is_none() {
            return Err(StoreError::MalformedRow { kind, message: "row has no id".into() });
        }
        let mut tables = self.tables.write().await;
        tables.entry(kind).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: Uuid,
        patch: Row,
        stamped_at: OffsetDateTime,
    ) -> Result<Row, StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(id)))
            .ok_or(StoreError::NotFound { kind, id })?;

        let previous = parse_timestamp(kind, row.get("updated_at"))?;
        let stamp = format_timestamp(kind, next_stamp(previous, stamped_at))?;

        for column in kind.mutable_columns() {
            if let Some(value) = patch.get(*column) {
                row.insert((*column).to_owned(), value.clone());
            }
        }
        row.insert("updated_at".into(), stamp.into());
        Ok(row.clone())
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(&kind).ok_or(StoreError::NotFound { kind, id })?;
        let before = rows.len();
        rows.retain(|row| row_id(row) != Some(id));
        if rows.len() == before {
            return Err(StoreError::NotFound { kind, id });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
