//! Edit sessions: one draft per content kind.
//!
//! DESIGN
//! ======
//! `EditSession<K>` is the single-item state machine every kind shares:
//!
//! ```text
//! Idle ──begin_new──▶ New { fields }
//! Idle ──begin_edit─▶ Existing { id, fields }
//! New | Existing ──cancel / successful save──▶ Idle
//! ```
//!
//! Starting a draft while one is open replaces it. A failed save keeps the
//! state and the fields exactly as they were and records the message in
//! `last_error`. A failed image upload leaves the image field untouched.
//!
//! `KindEditor` erases `K` so the panel can address a session by
//! `EntityKind` at runtime. Drafts cross that boundary as JSON.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::assets::{AssetError, AssetStore, ImageUpload};
use super::repository::{ContentRepository, RepoError};
use super::sync::{Cached, ContentSnapshot};
use crate::content::{ContentKind, EntityKind, ServiceKind, ValidationError, merge_fields};
use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no {0} draft is open")]
    NotDrafting(EntityKind),
    #[error(transparent)]
    Validation(ValidationError),
    #[error(transparent)]
    Repository(RepoError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("{0} has no image field")]
    NoImageField(EntityKind),
    #[error("point {index} is out of range; the draft has {len} point(s)")]
    PointOutOfRange { index: usize, len: usize },
    #[error("{kind} record {id} is not in the current list")]
    RecordNotCached { kind: EntityKind, id: Uuid },
    #[error("invalid {kind} draft fields: {message}")]
    InvalidPatch { kind: EntityKind, message: String },
}

impl From<RepoError> for SessionError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(e) => Self::Validation(e),
            other => Self::Repository(other),
        }
    }
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotDrafting(_) => "E_NOT_DRAFTING",
            Self::Validation(e) => e.error_code(),
            Self::Repository(e) => e.error_code(),
            Self::Asset(e) => e.error_code(),
            Self::NoImageField(_) => "E_NO_IMAGE_FIELD",
            Self::PointOutOfRange { .. } => "E_POINT_OUT_OF_RANGE",
            Self::RecordNotCached { .. } => "E_NOT_FOUND",
            Self::InvalidPatch { .. } => "E_INVALID_PATCH",
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::NotDrafting(_) => StatusCode::CONFLICT,
            Self::Validation(e) => e.status(),
            Self::Repository(e) => e.status(),
            Self::Asset(e) => e.status(),
            Self::NoImageField(_) | Self::PointOutOfRange { .. } | Self::InvalidPatch { .. } => StatusCode::BAD_REQUEST,
            Self::RecordNotCached { .. } => StatusCode::NOT_FOUND,
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Repository(e) => e.retryable(),
            Self::Asset(e) => e.retryable(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState<F> {
    Idle,
    New { fields: F },
    Existing { id: Uuid, fields: F },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    Idle,
    New,
    Existing,
}

/// Serializable view of one session, as shown to the operator.
#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub kind: EntityKind,
    pub state: DraftState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

// =============================================================================
// EDIT SESSION
// =============================================================================

#[derive(Debug)]
pub struct EditSession<K: ContentKind> {
    state: SessionState<K::Fields>,
    last_error: Option<String>,
}

impl<K: ContentKind> Default for EditSession<K> {
    fn default() -> Self {
        Self { state: SessionState::Idle, last_error: None }
    }
}

impl<K: ContentKind> EditSession<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState<K::Fields> {
        &self.state
    }

    #[must_use]
    pub fn draft(&self) -> Option<&K::Fields> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::New { fields } | SessionState::Existing { fields, .. } => Some(fields),
        }
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn draft_mut(&mut self) -> Result<&mut K::Fields, SessionError> {
        match &mut self.state {
            SessionState::Idle => Err(SessionError::NotDrafting(K::KIND)),
            SessionState::New { fields } | SessionState::Existing { fields, .. } => Ok(fields),
        }
    }

    /// Open a blank draft with the kind's defaults.
    pub fn begin_new(&mut self) {
        self.state = SessionState::New { fields: K::draft_defaults() };
        self.last_error = None;
    }

    /// Open a draft copied field-for-field from `record`.
    pub fn begin_edit(&mut self, record: &K::Record) {
        self.state = SessionState::Existing { id: K::record_id(record), fields: K::fields_of(record) };
        self.last_error = None;
    }

    /// Merge the set fields of `patch` into the open draft.
    ///
    /// # Errors
    ///
    /// Returns `NotDrafting` when idle.
    pub fn apply_patch(&mut self, patch: &K::Fields) -> Result<(), SessionError> {
        let draft = self.draft_mut()?;
        *draft = merge_fields(draft, patch)
            .map_err(|e| SessionError::InvalidPatch { kind: K::KIND, message: e.to_string() })?;
        Ok(())
    }

    /// Drop the draft without touching the repository.
    pub fn cancel(&mut self) {
        self.state = SessionState::Idle;
        self.last_error = None;
    }

    /// Persist the draft: create for a new draft, merge-update for an
    /// existing one. Returns to `Idle` only on success.
    ///
    /// # Errors
    ///
    /// Returns `NotDrafting` when idle, `Validation` for missing required
    /// fields, or `Repository` when the store call fails.
    pub async fn save(&mut self, repo: &ContentRepository) -> Result<K::Record, SessionError> {
        let result = match &self.state {
            SessionState::Idle => return Err(SessionError::NotDrafting(K::KIND)),
            SessionState::New { fields } => repo.create::<K>(fields.clone()).await,
            SessionState::Existing { id, fields } => repo.update::<K>(*id, fields.clone()).await,
        };

        match result {
            Ok(record) => {
                self.state = SessionState::Idle;
                self.last_error = None;
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(kind = %K::KIND, error = %e, "draft save failed; draft kept");
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Upload an image and store its URL in the draft's image field.
    ///
    /// # Errors
    ///
    /// Returns `NotDrafting` when idle, `NoImageField` for kinds without an
    /// image, or `Asset` when the upload fails. The field is unchanged on
    /// every error.
    pub async fn attach_image(&mut self, assets: &dyn AssetStore, upload: ImageUpload) -> Result<String, SessionError> {
        if K::image_slot(self.draft_mut()?).is_none() {
            return Err(SessionError::NoImageField(K::KIND));
        }

        let url = match assets.upload(upload).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(kind = %K::KIND, error = %e, "image upload failed; draft kept");
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        // The draft cannot change while `&mut self` is held across the upload.
        if let Some(slot) = K::image_slot(self.draft_mut()?) {
            *slot = Some(url.clone());
        }
        self.last_error = None;
        Ok(url)
    }

    fn view(&self) -> DraftView {
        let (state, id, fields) = match &self.state {
            SessionState::Idle => (DraftState::Idle, None, None),
            SessionState::New { fields } => (DraftState::New, None, Some(fields)),
            SessionState::Existing { id, fields } => (DraftState::Existing, Some(*id), Some(fields)),
        };
        DraftView {
            kind: K::KIND,
            state,
            id,
            fields: fields.and_then(|f| serde_json::to_value(f).ok()),
            last_error: self.last_error.clone(),
        }
    }
}

// =============================================================================
// SERVICE POINTS
// =============================================================================

impl EditSession<ServiceKind> {
    fn points_mut(&mut self) -> Result<&mut Vec<String>, SessionError> {
        Ok(self.draft_mut()?.points.get_or_insert_with(Vec::new))
    }

    /// Append an empty point and return its index.
    ///
    /// # Errors
    ///
    /// Returns `NotDrafting` when idle.
    pub fn add_point(&mut self) -> Result<usize, SessionError> {
        let points = self.points_mut()?;
        points.push(String::new());
        Ok(points.len() - 1)
    }

    /// # Errors
    ///
    /// Returns `NotDrafting` when idle or `PointOutOfRange`.
    pub fn set_point(&mut self, index: usize, text: String) -> Result<(), SessionError> {
        let points = self.points_mut()?;
        let len = points.len();
        let point = points.get_mut(index).ok_or(SessionError::PointOutOfRange { index, len })?;
        *point = text;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NotDrafting` when idle or `PointOutOfRange`.
    pub fn remove_point(&mut self, index: usize) -> Result<(), SessionError> {
        let points = self.points_mut()?;
        if index >= points.len() {
            return Err(SessionError::PointOutOfRange { index, len: points.len() });
        }
        points.remove(index);
        Ok(())
    }
}

// =============================================================================
// KIND EDITOR
// =============================================================================

/// Runtime-dispatched view of an `EditSession<K>`.
#[async_trait::async_trait]
pub trait KindEditor: Send + Sync {
    fn kind(&self) -> EntityKind;

    fn view(&self) -> DraftView;

    /// Id of the persisted record being edited, if any.
    fn draft_id(&self) -> Option<Uuid>;

    fn begin_new(&mut self);

    /// Open the cached record `id` for editing.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotCached` when `id` is not in `snapshot`.
    fn begin_edit(&mut self, snapshot: &ContentSnapshot, id: Uuid) -> Result<(), SessionError>;

    /// Merge a JSON object of field values into the draft.
    ///
    /// # Errors
    ///
    /// Returns `NotDrafting` when idle or `InvalidPatch` when `patch` does
    /// not describe this kind's fields.
    fn apply_json(&mut self, patch: Value) -> Result<(), SessionError>;

    fn cancel(&mut self);

    /// Save and return the stored record as JSON.
    ///
    /// # Errors
    ///
    /// See [`EditSession::save`].
    async fn save(&mut self, repo: &ContentRepository) -> Result<Value, SessionError>;

    /// # Errors
    ///
    /// See [`EditSession::attach_image`].
    async fn attach_image(&mut self, assets: &dyn AssetStore, upload: ImageUpload) -> Result<String, SessionError>;
}

#[async_trait::async_trait]
impl<K: Cached> KindEditor for EditSession<K> {
    fn kind(&self) -> EntityKind {
        K::KIND
    }

    fn view(&self) -> DraftView {
        EditSession::view(self)
    }

    fn draft_id(&self) -> Option<Uuid> {
        match &self.state {
            SessionState::Existing { id, .. } => Some(*id),
            SessionState::Idle | SessionState::New { .. } => None,
        }
    }

    fn begin_new(&mut self) {
        EditSession::begin_new(self);
    }

    fn begin_edit(&mut self, snapshot: &ContentSnapshot, id: Uuid) -> Result<(), SessionError> {
        let record = K::cached(snapshot)
            .iter()
            .find(|record| K::record_id(record) == id)
            .ok_or(SessionError::RecordNotCached { kind: K::KIND, id })?;
        EditSession::begin_edit(self, record);
        Ok(())
    }

    fn apply_json(&mut self, patch: Value) -> Result<(), SessionError> {
        let patch: K::Fields = serde_json::from_value(patch)
            .map_err(|e| SessionError::InvalidPatch { kind: K::KIND, message: e.to_string() })?;
        self.apply_patch(&patch)
    }

    fn cancel(&mut self) {
        EditSession::cancel(self);
    }

    async fn save(&mut self, repo: &ContentRepository) -> Result<Value, SessionError> {
        let record = EditSession::save(self, repo).await?;
        serde_json::to_value(record)
            .map_err(|e| SessionError::Repository(RepoError::Decode { kind: K::KIND, message: e.to_string() }))
    }

    async fn attach_image(&mut self, assets: &dyn AssetStore, upload: ImageUpload) -> Result<String, SessionError> {
        EditSession::attach_image(self, assets, upload).await
    }
}

#[cfg(test)]
#[path = "edit_session_test.rs"]
mod tests;
