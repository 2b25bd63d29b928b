//! Entity repository: typed create, update, delete and list for every kind.
//!
//! DESIGN
//! ======
//! One generic implementation parameterised by `ContentKind`. Validation runs
//! before the store is touched, so a rejected create never leaves a row
//! behind. Identifiers and timestamps are assigned here; the ordering
//! assigner supplies `display_order`.
//!
//! ERROR HANDLING
//! ==============
//! A store-level `NotFound` is lifted to `RepoError::NotFound` so callers can
//! tell a missing record from a backend failure.

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use super::ordering;
use crate::content::{CheckMode, ContentKind, EntityKind, ValidationError, to_object};
use crate::db::store::format_timestamp;
use crate::db::{ContentStore, Row, StoreError};
use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} record not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },
    #[error("{kind} already exists; update it instead")]
    SingletonOccupied { kind: EntityKind },
    #[error(transparent)]
    Store(StoreError),
    #[error("could not decode {kind} record: {message}")]
    Decode { kind: EntityKind, message: String },
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Store(other),
        }
    }
}

impl ErrorCode for RepoError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::SingletonOccupied { .. } => "E_SINGLETON_OCCUPIED",
            Self::Store(e) => e.error_code(),
            Self::Decode { .. } => "E_DECODE",
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        match self {
            Self::Validation(e) => e.status(),
            Self::NotFound { .. } => axum::http::StatusCode::NOT_FOUND,
            Self::SingletonOccupied { .. } => axum::http::StatusCode::CONFLICT,
            Self::Store(e) => e.status(),
            Self::Decode { .. } => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.retryable())
    }
}

fn decode<K: ContentKind>(row: Row) -> Result<K::Record, RepoError> {
    serde_json::from_value(serde_json::Value::Object(row))
        .map_err(|e| RepoError::Decode { kind: K::KIND, message: e.to_string() })
}

fn encode<K: ContentKind>(fields: &K::Fields) -> Result<Row, RepoError> {
    let mut row = to_object(fields).map_err(|e| RepoError::Decode { kind: K::KIND, message: e.to_string() })?;
    if !K::KIND.is_ordered() {
        row.remove("display_order");
    }
    Ok(row)
}

// =============================================================================
// REPOSITORY
// =============================================================================

#[derive(Clone)]
pub struct ContentRepository {
    store: Arc<dyn ContentStore>,
}

impl ContentRepository {
    #[must_use]
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Every record of `K`, ascending by `display_order` for ordered kinds.
    ///
    /// # Errors
    ///
    /// Returns a store or decode error.
    pub async fn list<K: ContentKind>(&self) -> Result<Vec<K::Record>, RepoError> {
        let rows = self.store.select_all(K::KIND).await?;
        rows.into_iter().map(decode::<K>).collect()
    }

    /// The one record of a singleton kind, if it exists.
    ///
    /// # Errors
    ///
    /// Returns a store or decode error.
    pub async fn single<K: ContentKind>(&self) -> Result<Option<K::Record>, RepoError> {
        Ok(self.list::<K>().await?.into_iter().next())
    }

    /// Insert a new record. Any `display_order` in `fields` is replaced by the
    /// append position.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when a required field is missing,
    /// `SingletonOccupied` for a second hero, or a store error.
    pub async fn create<K: ContentKind>(&self, fields: K::Fields) -> Result<K::Record, RepoError> {
        K::check(&fields, CheckMode::Create)?;

        let kind = K::KIND;
        let mut row = encode::<K>(&K::creation_defaults(fields))?;

        if kind.is_ordered() {
            let order = ordering::assign_display_order(self.store.as_ref(), kind).await?;
            row.insert("display_order".into(), order.into());
        } else if self.store.count(kind).await? > 0 {
            return Err(RepoError::SingletonOccupied { kind });
        }

        let id = Uuid::new_v4();
        let now = format_timestamp(kind, OffsetDateTime::now_utc())?;
        row.insert("id".into(), id.to_string().into());
        row.insert("created_at".into(), now.clone().into());
        row.insert("updated_at".into(), now.into());

        let stored = self.store.insert(kind, row).await?;
        let record = decode::<K>(stored)?;
        tracing::info!(%kind, %id, "content record created");
        Ok(record)
    }

    /// Merge `fields` into the record with `id`. Unset fields keep their
    /// stored values; `updated_at` always advances.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when a required field is supplied blank,
    /// `NotFound` for an unknown id, or a store error.
    pub async fn update<K: ContentKind>(&self, id: Uuid, fields: K::Fields) -> Result<K::Record, RepoError> {
        K::check(&fields, CheckMode::Patch)?;

        let kind = K::KIND;
        let patch = encode::<K>(&fields)?;
        let columns = patch.len();
        let stored = self.store.update(kind, id, patch, OffsetDateTime::now_utc()).await?;
        let record = decode::<K>(stored)?;
        tracing::info!(%kind, %id, columns, "content record updated");
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or a store error.
    pub async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), RepoError> {
        self.store.delete(kind, id).await?;
        tracing::info!(%kind, %id, "content record deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "repository_test.rs"]
mod tests;
