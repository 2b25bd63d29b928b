mod config;
mod content;
mod db;
mod error;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::db::{ContentStore, MemoryContentStore, PgContentStore};
use crate::services::assets::{AssetStore, DisabledAssetStore, StorageBucket};
use crate::services::gate::Gate;
use crate::services::repository::ContentRepository;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env().expect("invalid configuration");

    let store: Arc<dyn ContentStore> = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed");
            tracing::info!(max_connections = config.db_max_connections, "postgres content store ready");
            Arc::new(PgContentStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; content is kept in memory and lost on restart");
            Arc::new(MemoryContentStore::new())
        }
    };

    // Uploads are optional: without storage config the panel still edits text.
    let assets: Arc<dyn AssetStore> = match &config.storage {
        Some(storage) => match StorageBucket::new(storage) {
            Ok(bucket) => {
                tracing::info!(bucket = %storage.bucket, "image storage configured");
                Arc::new(bucket)
            }
            Err(e) => {
                tracing::warn!(error = %e, "image storage unavailable; uploads disabled");
                Arc::new(DisabledAssetStore)
            }
        },
        None => {
            tracing::warn!("STORAGE_URL/STORAGE_SERVICE_KEY not set; uploads disabled");
            Arc::new(DisabledAssetStore)
        }
    };

    let state = state::AppState::new(ContentRepository::new(store), assets, Gate::new(config.admin_passphrase))
        .with_limits(config.max_open_panels, config.upload_max_bytes);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "studio-cms listening");
    axum::serve(listener, app).await.expect("server failed");
}
