//! Public read of published content for the marketing site.

use axum::extract::State;
use axum::response::Json;

use crate::error::ApiError;
use crate::services::sync::{ContentSnapshot, fetch_snapshot};
use crate::state::AppState;

/// `GET /api/content`: all five kinds, fetched fresh from the store.
pub async fn published(State(state): State<AppState>) -> Result<Json<ContentSnapshot>, ApiError> {
    let snapshot = fetch_snapshot(&state.repo).await.map_err(|e| {
        tracing::error!(error = %e, "public content fetch failed");
        ApiError::from_err(e)
    })?;
    Ok(Json(snapshot))
}
