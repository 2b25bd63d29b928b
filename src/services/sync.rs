//! List synchronizer: the panel's cached view of all five kinds.
//!
//! DESIGN
//! ======
//! After any successful mutation the panel re-fetches every kind, not just
//! the one that changed. The five list calls run concurrently and the refresh
//! resolves once all of them have. The cached snapshot is replaced as a whole
//! (`Arc` swap), so readers never observe a half-applied refresh.
//!
//! ERROR HANDLING
//! ==============
//! A kind whose fetch fails keeps its previous list. The failure is logged
//! and returned in the `RefreshReport`; it never clears the view.

use std::sync::Arc;

use serde::Serialize;

use super::repository::{ContentRepository, RepoError};
use crate::content::{
    ContentKind, EntityKind, GalleryImage, GalleryKind, HeroKind, HeroSection, Review, ReviewKind, Service,
    ServiceKind, Workshop, WorkshopKind,
};

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Every content list at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentSnapshot {
    pub hero: Option<HeroSection>,
    pub services: Vec<Service>,
    pub workshops: Vec<Workshop>,
    pub gallery: Vec<GalleryImage>,
    pub reviews: Vec<Review>,
}

/// Kinds whose cached records can be looked up in a snapshot.
pub trait Cached: ContentKind {
    fn cached(snapshot: &ContentSnapshot) -> &[Self::Record];
}

impl Cached for HeroKind {
    fn cached(snapshot: &ContentSnapshot) -> &[HeroSection] {
        snapshot.hero.as_slice()
    }
}

impl Cached for ServiceKind {
    fn cached(snapshot: &ContentSnapshot) -> &[Service] {
        &snapshot.services
    }
}

impl Cached for WorkshopKind {
    fn cached(snapshot: &ContentSnapshot) -> &[Workshop] {
        &snapshot.workshops
    }
}

impl Cached for GalleryKind {
    fn cached(snapshot: &ContentSnapshot) -> &[GalleryImage] {
        &snapshot.gallery
    }
}

impl Cached for ReviewKind {
    fn cached(snapshot: &ContentSnapshot) -> &[Review] {
        &snapshot.reviews
    }
}

/// Fetch all five kinds, failing if any fetch fails.
///
/// # Errors
///
/// Returns the first repository error.
pub async fn fetch_snapshot(repo: &ContentRepository) -> Result<ContentSnapshot, RepoError> {
    let (hero, services, workshops, gallery, reviews) = tokio::try_join!(
        repo.single::<HeroKind>(),
        repo.list::<ServiceKind>(),
        repo.list::<WorkshopKind>(),
        repo.list::<GalleryKind>(),
        repo.list::<ReviewKind>(),
    )?;
    Ok(ContentSnapshot { hero, services, workshops, gallery, reviews })
}

// =============================================================================
// SYNCHRONIZER
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RefreshFailure {
    pub kind: EntityKind,
    pub message: String,
}

/// Outcome of one refresh. Empty `failed` means every list is current.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshReport {
    pub failed: Vec<RefreshFailure>,
}

impl RefreshReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn settle<T: Clone>(&mut self, kind: EntityKind, fetched: Result<T, RepoError>, prior: &T) -> T {
        match fetched {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%kind, error = %e, "list refresh failed; keeping previous list");
                self.failed.push(RefreshFailure { kind, message: e.to_string() });
                prior.clone()
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ListSynchronizer {
    current: Arc<ContentSnapshot>,
}

impl ListSynchronizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest snapshot. Cheap to clone and safe to hold across a refresh.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ContentSnapshot> {
        Arc::clone(&self.current)
    }

    /// Re-fetch all five kinds and swap in the new snapshot.
    pub async fn refresh(&mut self, repo: &ContentRepository) -> RefreshReport {
        let (hero, services, workshops, gallery, reviews) = tokio::join!(
            repo.single::<HeroKind>(),
            repo.list::<ServiceKind>(),
            repo.list::<WorkshopKind>(),
            repo.list::<GalleryKind>(),
            repo.list::<ReviewKind>(),
        );

        let prior = Arc::clone(&self.current);
        let mut report = RefreshReport::default();
        let next = ContentSnapshot {
            hero: report.settle(EntityKind::HeroSection, hero, &prior.hero),
            services: report.settle(EntityKind::Service, services, &prior.services),
            workshops: report.settle(EntityKind::Workshop, workshops, &prior.workshops),
            gallery: report.settle(EntityKind::GalleryImage, gallery, &prior.gallery),
            reviews: report.settle(EntityKind::Review, reviews, &prior.reviews),
        };
        self.current = Arc::new(next);

        tracing::debug!(failed = report.failed.len(), "content lists refreshed");
        report
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
