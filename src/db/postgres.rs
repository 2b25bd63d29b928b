//! `PostgreSQL` content store.
//!
//! Rows travel as `jsonb`: `to_jsonb(t)` on the way out and
//! `jsonb_populate_record` on the way in, so the same four statements serve
//! all five tables. Table and column names come from `EntityKind`, never from
//! request input.

use serde_json::Value;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::store::{ContentStore, Row, StoreError};
use crate::content::EntityKind;

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_clause(kind: EntityKind) -> &'static str {
    if kind.is_ordered() { "t.display_order ASC, t.created_at ASC, t.id ASC" } else { "t.created_at ASC, t.id ASC" }
}

pub(crate) fn select_sql(kind: EntityKind) -> String {
    format!("SELECT to_jsonb(t) FROM {} t ORDER BY {}", kind.table(), order_clause(kind))
}

pub(crate) fn insert_sql(kind: EntityKind) -> String {
    let table = kind.table();
    format!("INSERT INTO {table} AS t SELECT * FROM jsonb_populate_record(NULL::{table}, $1) RETURNING to_jsonb(t)")
}

pub(crate) fn update_sql(kind: EntityKind) -> String {
    let cols = kind.mutable_columns().join(", ");
    format!(
        "UPDATE {table} AS t \
         SET ({cols}) = (SELECT {cols} FROM jsonb_populate_record(t, $2)), \
             updated_at = GREATEST($3, t.updated_at + interval '1 microsecond') \
         WHERE t.id = $1 \
         RETURNING to_jsonb(t)",
        table = kind.table(),
    )
}

fn into_row(kind: EntityKind, value: Value) -> Result<Row, StoreError> {
    match value {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::MalformedRow { kind, message: format!("expected object, got {other}") }),
    }
}

#[async_trait::async_trait]
impl ContentStore for PgContentStore {
    async fn select_all(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError> {
        let values: Vec<Value> = sqlx::query_scalar(&select_sql(kind)).fetch_all(&self.pool).await?;
        values.into_iter().map(|value| into_row(kind, value)).collect()
    }

    async fn count(&self, kind: EntityKind) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn insert(&self, kind: EntityKind, row: Row) -> Result<Row, StoreError> {
        let value: Value = sqlx::query_scalar(&insert_sql(kind))
            .bind(Value::Object(row))
            .fetch_one(&self.pool)
            .await?;
        into_row(kind, value)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: Uuid,
        patch: Row,
        stamped_at: OffsetDateTime,
    ) -> Result<Row, StoreError> {
        let value: Option<Value> = sqlx::query_scalar(&update_sql(kind))
            .bind(id)
            .bind(Value::Object(patch))
            .bind(stamped_at)
            .fetch_optional(&self.pool)
            .await?;
        let value = value.ok_or(StoreError::NotFound { kind, id })?;
        into_row(kind, value)
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { kind, id });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "postgres_test.rs"]
mod tests;
