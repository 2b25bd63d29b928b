//! Database initialization and content stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup builds a `PgContentStore` from the pool created here, running the
//! embedded migrations first. Without a database URL the service falls back
//! to `MemoryContentStore`.

pub mod memory;
pub mod postgres;
pub mod store;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use memory::MemoryContentStore;
pub use postgres::PgContentStore;
pub use store::{ContentStore, Row, StoreError};

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
