//! Admin panel: the five edit sessions plus the cached content lists.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `AdminPanel` exists per opened gate session. Routes lock it, run one
//! draft operation, and release it. Every successful save or delete is
//! followed by a full list refresh.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::assets::{AssetStore, ImageUpload};
use super::edit_session::{DraftView, EditSession, KindEditor, SessionError};
use super::repository::{ContentRepository, RepoError};
use super::sync::{ContentSnapshot, ListSynchronizer, RefreshReport};
use crate::content::{EntityKind, GalleryKind, HeroKind, ReviewKind, ServiceKind, WorkshopKind};

/// One session per kind, addressable by `EntityKind`.
#[derive(Debug, Default)]
pub struct EditSessions {
    pub hero: EditSession<HeroKind>,
    pub services: EditSession<ServiceKind>,
    pub workshops: EditSession<WorkshopKind>,
    pub gallery: EditSession<GalleryKind>,
    pub reviews: EditSession<ReviewKind>,
}

impl EditSessions {
    #[must_use]
    pub fn editor(&self, kind: EntityKind) -> &dyn KindEditor {
        match kind {
            EntityKind::HeroSection => &self.hero,
            EntityKind::Service => &self.services,
            EntityKind::Workshop => &self.workshops,
            EntityKind::GalleryImage => &self.gallery,
            EntityKind::Review => &self.reviews,
        }
    }

    pub fn editor_mut(&mut self, kind: EntityKind) -> &mut dyn KindEditor {
        match kind {
            EntityKind::HeroSection => &mut self.hero,
            EntityKind::Service => &mut self.services,
            EntityKind::Workshop => &mut self.workshops,
            EntityKind::GalleryImage => &mut self.gallery,
            EntityKind::Review => &mut self.reviews,
        }
    }
}

/// Result of a save: the stored record, the now-idle draft, and how the
/// follow-up refresh went.
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub record: Value,
    pub draft: DraftView,
    pub refresh: RefreshReport,
}

pub struct AdminPanel {
    pub sessions: EditSessions,
    lists: ListSynchronizer,
    repo: ContentRepository,
}

impl AdminPanel {
    /// Build a panel and run the initial fetch of all five kinds.
    pub async fn open(repo: ContentRepository) -> (Self, RefreshReport) {
        let mut panel = Self { sessions: EditSessions::default(), lists: ListSynchronizer::new(), repo };
        let report = panel.refresh().await;
        (panel, report)
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<ContentSnapshot> {
        self.lists.snapshot()
    }

    pub async fn refresh(&mut self) -> RefreshReport {
        self.lists.refresh(&self.repo).await
    }

    #[must_use]
    pub fn draft(&self, kind: EntityKind) -> DraftView {
        self.sessions.editor(kind).view()
    }

    pub fn begin_new(&mut self, kind: EntityKind) -> DraftView {
        let editor = self.sessions.editor_mut(kind);
        editor.begin_new();
        editor.view()
    }

    /// # Errors
    ///
    /// Returns `RecordNotCached` when `id` is not in the current list.
    pub fn begin_edit(&mut self, kind: EntityKind, id: Uuid) -> Result<DraftView, SessionError> {
        let snapshot = self.lists.snapshot();
        let editor = self.sessions.editor_mut(kind);
        editor.begin_edit(&snapshot, id)?;
        Ok(editor.view())
    }

    /// # Errors
    ///
    /// Returns `NotDrafting` or `InvalidPatch`.
    pub fn patch_draft(&mut self, kind: EntityKind, patch: Value) -> Result<DraftView, SessionError> {
        let editor = self.sessions.editor_mut(kind);
        editor.apply_json(patch)?;
        Ok(editor.view())
    }

    pub fn cancel(&mut self, kind: EntityKind) -> DraftView {
        let editor = self.sessions.editor_mut(kind);
        editor.cancel();
        editor.view()
    }

    /// Save the draft for `kind`, then refresh every list.
    ///
    /// # Errors
    ///
    /// Returns the save error; the draft is left as it was.
    pub async fn save(&mut self, kind: EntityKind) -> Result<SaveOutcome, SessionError> {
        let record = self.sessions.editor_mut(kind).save(&self.repo).await?;
        let refresh = self.refresh().await;
        Ok(SaveOutcome { record, draft: self.draft(kind), refresh })
    }

    /// Delete a record, then refresh every list. A draft editing that record
    /// is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, or a store error.
    pub async fn delete(&mut self, kind: EntityKind, id: Uuid) -> Result<RefreshReport, RepoError> {
        self.repo.delete(kind, id).await?;

        let editor = self.sessions.editor_mut(kind);
        if editor.draft_id() == Some(id) {
            editor.cancel();
            tracing::info!(%kind, %id, "draft for deleted record cancelled");
        }
        Ok(self.refresh().await)
    }

    /// Upload an image into the draft for `kind`.
    ///
    /// # Errors
    ///
    /// See [`EditSession::attach_image`].
    pub async fn attach_image(
        &mut self,
        kind: EntityKind,
        assets: &dyn AssetStore,
        upload: ImageUpload,
    ) -> Result<DraftView, SessionError> {
        let editor = self.sessions.editor_mut(kind);
        editor.attach_image(assets, upload).await?;
        Ok(editor.view())
    }
}

#[cfg(test)]
#[path = "panel_test.rs"]
mod tests;
