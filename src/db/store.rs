//! Backing-store seam for the content tables.
//!
//! DESIGN
//! ======
//! Rows cross this boundary as JSON objects keyed by column name. The
//! repository owns typing and validation; a store only has to read, write and
//! stamp rows for a table named by `EntityKind`. That keeps one generic
//! implementation per backend instead of one per kind.
//!
//! Timestamps inside rows are RFC 3339 strings.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::content::EntityKind;

pub type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{kind} record not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },
    #[error("malformed {kind} row: {message}")]
    MalformedRow { kind: EntityKind, message: String },
    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_DATABASE",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::MalformedRow { .. } => "E_MALFORMED_ROW",
            Self::Unavailable(_) => "E_STORE_UNAVAILABLE",
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        match self {
            Self::NotFound { .. } => axum::http::StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Unavailable(_) => axum::http::StatusCode::BAD_GATEWAY,
            Self::MalformedRow { .. } => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Unavailable(_))
    }
}

/// Per-table row access. Implementations must be safe to share across tasks.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Every row of `kind`. Ordered kinds ascend by `display_order`, ties by
    /// creation; the hero table by creation.
    async fn select_all(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError>;

    async fn count(&self, kind: EntityKind) -> Result<i64, StoreError>;

    /// Insert a complete row and return it as stored.
    async fn insert(&self, kind: EntityKind, row: Row) -> Result<Row, StoreError>;

    /// Overlay `patch` on the row with `id`. `updated_at` becomes
    /// `stamped_at`, or one microsecond past the stored value when the clock
    /// has not moved on.
    async fn update(&self, kind: EntityKind, id: Uuid, patch: Row, stamped_at: OffsetDateTime)
    -> Result<Row, StoreError>;

    /// # Errors
    ///
    /// Returns `NotFound` when no row has `id`.
    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError>;
}

pub(crate) fn format_timestamp(kind: EntityKind, at: OffsetDateTime) -> Result<String, StoreError> {
    at.format(&Rfc3339).map_err(|e| StoreError::MalformedRow { kind, message: e.to_string() })
}

pub(crate) fn parse_timestamp(kind: EntityKind, raw: Option<&serde_json::Value>) -> Result<OffsetDateTime, StoreError> {
    let text = raw
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| StoreError::MalformedRow { kind, message: "missing timestamp".into() })?;
    OffsetDateTime::parse(text, &Rfc3339).map_err(|e| StoreError::MalformedRow { kind, message: e.to_string() })
}

/// The `updated_at` a mutation should record given the previous stamp.
#[must_use]
pub fn next_stamp(previous: OffsetDateTime, now: OffsetDateTime) -> OffsetDateTime {
    now.max(previous + time::Duration::microseconds(1))
}

pub(crate) fn row_id(row: &Row) -> Option<Uuid> {
    row.get("id").and_then(serde_json::Value::as_str).and_then(|raw| Uuid::parse_str(raw).ok())
}
