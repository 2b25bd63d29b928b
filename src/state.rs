//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the content repository, the asset store, the gate, and the open
//! admin panels keyed by gate token. Each panel sits behind its own async
//! mutex so a draft operation, upload included, runs to completion before
//! the next one on that panel starts.
//!
//! TRADE-OFFS
//! ==========
//! Panels live only in memory. At most `max_open_panels` are kept; opening
//! one more evicts the panel opened longest ago, whose cookie then stops
//! working and needs a fresh login.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock};

use crate::config::{DEFAULT_MAX_OPEN_PANELS, DEFAULT_UPLOAD_MAX_BYTES};
use crate::services::assets::AssetStore;
use crate::services::gate::Gate;
use crate::services::panel::AdminPanel;
use crate::services::repository::ContentRepository;

pub type SharedPanel = Arc<Mutex<AdminPanel>>;

/// A panel plus the order in which it was opened.
pub struct OpenPanel {
    pub panel: SharedPanel,
    opened: u64,
}

/// Shared application state. Clone is required by Axum; every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub repo: ContentRepository,
    pub assets: Arc<dyn AssetStore>,
    pub gate: Arc<Gate>,
    /// Open panels keyed by the token issued at login.
    pub panels: Arc<RwLock<HashMap<String, OpenPanel>>>,
    pub max_open_panels: usize,
    pub upload_max_bytes: usize,
    opened_seq: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(repo: ContentRepository, assets: Arc<dyn AssetStore>, gate: Gate) -> Self {
        Self {
            repo,
            assets,
            gate: Arc::new(gate),
            panels: Arc::new(RwLock::new(HashMap::new())),
            max_open_panels: DEFAULT_MAX_OPEN_PANELS,
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            opened_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Override the panel cap (at least 1) and the upload body limit.
    #[must_use]
    pub fn with_limits(mut self, max_open_panels: usize, upload_max_bytes: usize) -> Self {
        self.max_open_panels = max_open_panels.max(1);
        self.upload_max_bytes = upload_max_bytes;
        self
    }

    pub async fn panel(&self, token: &str) -> Option<SharedPanel> {
        self.panels.read().await.get(token).map(|open| Arc::clone(&open.panel))
    }

    /// Register a panel under `token`, evicting the oldest panels while the
    /// cap is reached.
    pub async fn insert_panel(&self, token: String, panel: AdminPanel) {
        let opened = self.opened_seq.fetch_add(1, Ordering::Relaxed);
        let mut panels = self.panels.write().await;
        while panels.len() >= self.max_open_panels {
            let Some(oldest) = panels.iter().min_by_key(|(_, open)| open.opened).map(|(t, _)| t.clone()) else {
                break;
            };
            panels.remove(&oldest);
            tracing::info!(open = panels.len(), "evicted oldest admin panel");
        }
        panels.insert(token, OpenPanel { panel: Arc::new(Mutex::new(panel)), opened });
    }

    /// Returns whether a panel was open under `token`.
    pub async fn remove_panel(&self, token: &str) -> bool {
        self.panels.write().await.remove(token).is_some()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::content::EntityKind;
    use crate::db::{ContentStore, MemoryContentStore, Row, StoreError};
    use crate::services::assets::{AssetError, DisabledAssetStore, ImageUpload};

    pub const TEST_PASSPHRASE: &str = "open-sesame";

    /// Repository over a fresh in-memory store.
    #[must_use]
    pub fn memory_repo() -> ContentRepository {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryContentStore::new());
        ContentRepository::new(store)
    }

    /// `AppState` on an empty memory store with uploads disabled.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(memory_repo(), Arc::new(DisabledAssetStore), Gate::new(TEST_PASSPHRASE))
    }

    /// `AppState` with a caller-supplied asset store.
    #[must_use]
    pub fn test_app_state_with_assets(assets: Arc<dyn AssetStore>) -> AppState {
        AppState::new(memory_repo(), assets, Gate::new(TEST_PASSPHRASE))
    }

    /// Asset store that returns a fixed URL for every upload.
    pub struct FixedUrlAssets(pub String);

    #[async_trait::async_trait]
    impl AssetStore for FixedUrlAssets {
        async fn upload(&self, upload: ImageUpload) -> Result<String, AssetError> {
            if upload.bytes.is_empty() {
                return Err(AssetError::EmptyUpload);
            }
            Ok(self.0.clone())
        }
    }

    /// Asset store whose uploads always fail in transit.
    pub struct FailingAssets;

    #[async_trait::async_trait]
    impl AssetStore for FailingAssets {
        async fn upload(&self, _upload: ImageUpload) -> Result<String, AssetError> {
            Err(AssetError::Request("connection reset".into()))
        }
    }

    /// Asset store whose uploads wait for `release` after signalling `started`.
    pub struct GatedAssets {
        pub url: String,
        pub started: tokio::sync::Notify,
        pub release: tokio::sync::Notify,
    }

    impl GatedAssets {
        #[must_use]
        pub fn new(url: &str) -> Self {
            Self { url: url.to_owned(), started: tokio::sync::Notify::new(), release: tokio::sync::Notify::new() }
        }
    }

    #[async_trait::async_trait]
    impl AssetStore for GatedAssets {
        async fn upload(&self, _upload: ImageUpload) -> Result<String, AssetError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(self.url.clone())
        }
    }

    /// Memory store that fails selected operations on demand.
    #[derive(Default)]
    pub struct FlakyStore {
        inner: MemoryContentStore,
        fail_writes: AtomicBool,
        failing_lists: StdMutex<HashSet<EntityKind>>,
    }

    impl FlakyStore {
        pub fn fail_writes(&self, on: bool) {
            self.fail_writes.store(on, Ordering::SeqCst);
        }

        pub fn fail_list(&self, kind: EntityKind, on: bool) {
            let mut failing = self.failing_lists.lock().unwrap();
            if on {
                failing.insert(kind);
            } else {
                failing.remove(&kind);
            }
        }

        fn check_write(&self) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("injected write failure".into()));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl ContentStore for FlakyStore {
        async fn select_all(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError> {
            let failing = self.failing_lists.lock().unwrap().contains(&kind);
            if failing {
                return Err(StoreError::Unavailable("injected list failure".into()));
            }
            self.inner.select_all(kind).await
        }

        async fn count(&self, kind: EntityKind) -> Result<i64, StoreError> {
            self.inner.count(kind).await
        }

        async fn insert(&self, kind: EntityKind, row: Row) -> Result<Row, StoreError> {
            self.check_write()?;
            self.inner.insert(kind, row).await
        }

        async fn update(
            &self,
            kind: EntityKind,
            id: Uuid,
            patch: Row,
            stamped_at: OffsetDateTime,
        ) -> Result<Row, StoreError> {
            self.check_write()?;
            self.inner.update(kind, id, patch, stamped_at).await
        }

        async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
            self.check_write()?;
            self.inner.delete(kind, id).await
        }
    }

    /// Repository over a `FlakyStore`, plus a handle to toggle failures.
    #[must_use]
    pub fn flaky_repo() -> (Arc<FlakyStore>, ContentRepository) {
        let store = Arc::new(FlakyStore::default());
        let repo = ContentRepository::new(store.clone());
        (store, repo)
    }

    #[must_use]
    pub fn png_upload() -> ImageUpload {
        ImageUpload { file_name: "studio.png".into(), content_type: Some("image/png".into()), bytes: vec![0x89, 0x50] }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
