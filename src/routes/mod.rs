//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Admin endpoints live under `/api/admin` and require the gate cookie. The
//! marketing site reads `/api/content`. `{kind}` segments are the slugs from
//! `EntityKind::slug`.

pub mod admin;
pub mod content;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let upload_max_bytes = state.upload_max_bytes;

    Router::new()
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route("/api/admin/content", get(admin::content))
        .route("/api/admin/content/refresh", post(admin::refresh))
        .route(
            "/api/admin/{kind}/draft",
            get(admin::get_draft)
                .post(admin::begin_draft)
                .patch(admin::patch_draft)
                .delete(admin::cancel_draft),
        )
        .route("/api/admin/{kind}/draft/save", post(admin::save_draft))
        .route(
            "/api/admin/{kind}/draft/image",
            post(admin::upload_image).layer(DefaultBodyLimit::max(upload_max_bytes)),
        )
        .route("/api/admin/{kind}/draft/points", post(admin::add_point))
        .route(
            "/api/admin/{kind}/draft/points/{index}",
            put(admin::set_point).delete(admin::remove_point),
        )
        .route("/api/admin/{kind}/records/{id}/edit", post(admin::edit_record))
        .route("/api/admin/{kind}/records/{id}", axum::routing::delete(admin::delete_record))
        .route("/api/content", get(content::published))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
