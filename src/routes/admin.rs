//! Admin routes: gate login, cached content, drafts, saves and deletes.
//!
//! Every route except login requires the `admin_session` cookie issued by
//! the gate. Handlers lock the caller's panel for the whole operation.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRef, Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::EntityKind;
use crate::error::ApiError;
use crate::services::assets::ImageUpload;
use crate::services::edit_session::DraftView;
use crate::services::panel::{AdminPanel, SaveOutcome};
use crate::services::sync::{ContentSnapshot, RefreshReport};
use crate::state::{AppState, SharedPanel};

pub(crate) const COOKIE_NAME: &str = "admin_session";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn parse_kind(slug: &str) -> Result<EntityKind, ApiError> {
    EntityKind::from_slug(slug).ok_or_else(|| ApiError::unknown_kind(slug))
}

fn require_services(kind: EntityKind) -> Result<(), ApiError> {
    if kind == EntityKind::Service {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("{kind} drafts have no points")))
    }
}

// =============================================================================
// SESSION EXTRACTOR
// =============================================================================

/// Open admin panel resolved from the session cookie.
/// Use as a handler parameter to require the gate.
pub struct AdminSession {
    pub token: String,
    pub panel: SharedPanel,
}

impl<S> axum::extract::FromRequestParts<S> for AdminSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(ApiError::unauthorized());
        }

        let app_state = AppState::from_ref(state);
        let panel = app_state.panel(token).await.ok_or_else(ApiError::unauthorized)?;
        Ok(Self { token: token.to_owned(), panel })
    }
}

// =============================================================================
// RESPONSE BODIES
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content: ContentSnapshot,
    pub refresh: RefreshReport,
}

fn content_response(panel: &AdminPanel, refresh: RefreshReport) -> Json<ContentResponse> {
    Json(ContentResponse { content: (*panel.snapshot()).clone(), refresh })
}

// =============================================================================
// GATE
// =============================================================================

#[derive(Deserialize)]
pub struct LoginBody {
    pub passphrase: String,
}

/// `POST /api/admin/login`: check the passphrase, open a panel, set cookie.
/// A panel already open under the caller's cookie is closed first.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<Response, ApiError> {
    let token = state.gate.check(&body.passphrase).map_err(ApiError::from_err)?;

    if let Some(previous) = jar.get(COOKIE_NAME).map(Cookie::value) {
        if state.remove_panel(previous).await {
            tracing::info!("previous admin panel closed on login");
        }
    }

    let (panel, refresh) = AdminPanel::open(state.repo.clone()).await;
    let response = content_response(&panel, refresh);
    state.insert_panel(token.clone(), panel).await;
    tracing::info!("admin panel opened");

    let cookie = Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure());
    Ok((jar.add(cookie), response).into_response())
}

/// `POST /api/admin/logout`: drop the panel and clear the cookie.
pub async fn logout(State(state): State<AppState>, session: AdminSession) -> Response {
    state.remove_panel(&session.token).await;
    tracing::info!("admin panel closed");

    let removal = Cookie::build((COOKIE_NAME, "")).path("/");
    (CookieJar::new().remove(removal), StatusCode::NO_CONTENT).into_response()
}

// =============================================================================
// CONTENT
// =============================================================================

/// `GET /api/admin/content`: cached lists for all five kinds.
pub async fn content(session: AdminSession) -> Json<ContentSnapshot> {
    let panel = session.panel.lock().await;
    Json((*panel.snapshot()).clone())
}

/// `POST /api/admin/content/refresh`: re-fetch every list.
pub async fn refresh(session: AdminSession) -> Json<ContentResponse> {
    let mut panel = session.panel.lock().await;
    let report = panel.refresh().await;
    content_response(&panel, report)
}

// =============================================================================
// DRAFTS
// =============================================================================

/// `GET /api/admin/{kind}/draft`
pub async fn get_draft(session: AdminSession, Path(slug): Path<String>) -> Result<Json<DraftView>, ApiError> {
    let kind = parse_kind(&slug)?;
    let panel = session.panel.lock().await;
    Ok(Json(panel.draft(kind)))
}

/// `POST /api/admin/{kind}/draft`: start a new record.
pub async fn begin_draft(session: AdminSession, Path(slug): Path<String>) -> Result<Json<DraftView>, ApiError> {
    let kind = parse_kind(&slug)?;
    let mut panel = session.panel.lock().await;
    Ok(Json(panel.begin_new(kind)))
}

/// `PATCH /api/admin/{kind}/draft`: merge field values into the draft.
pub async fn patch_draft(
    session: AdminSession,
    Path(slug): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<DraftView>, ApiError> {
    let kind = parse_kind(&slug)?;
    let mut panel = session.panel.lock().await;
    panel.patch_draft(kind, patch).map(Json).map_err(ApiError::from_err)
}

/// `DELETE /api/admin/{kind}/draft`: cancel without saving.
pub async fn cancel_draft(session: AdminSession, Path(slug): Path<String>) -> Result<Json<DraftView>, ApiError> {
    let kind = parse_kind(&slug)?;
    let mut panel = session.panel.lock().await;
    Ok(Json(panel.cancel(kind)))
}

/// `POST /api/admin/{kind}/draft/save`
pub async fn save_draft(session: AdminSession, Path(slug): Path<String>) -> Result<Json<SaveOutcome>, ApiError> {
    let kind = parse_kind(&slug)?;
    let mut panel = session.panel.lock().await;
    panel.save(kind).await.map(Json).map_err(ApiError::from_err)
}

#[derive(Deserialize)]
pub struct ImageQuery {
    pub file_name: String,
}

/// `POST /api/admin/{kind}/draft/image?file_name=`: raw image body, up to
/// `AppState::upload_max_bytes`.
pub async fn upload_image(
    State(state): State<AppState>,
    session: AdminSession,
    Path(slug): Path<String>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DraftView>, ApiError> {
    let kind = parse_kind(&slug)?;
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::warn!(limit = state.upload_max_bytes, "image upload over body limit");
            ApiError::payload_too_large(state.upload_max_bytes)
        } else {
            ApiError::bad_request(rejection.body_text())
        }
    })?;
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_owned);
    let upload = ImageUpload { file_name: query.file_name, content_type, bytes: body.to_vec() };

    let mut panel = session.panel.lock().await;
    panel.attach_image(kind, state.assets.as_ref(), upload).await.map(Json).map_err(ApiError::from_err)
}

// =============================================================================
// SERVICE POINTS
// =============================================================================

/// `POST /api/admin/services/draft/points`: append an empty point.
pub async fn add_point(session: AdminSession, Path(slug): Path<String>) -> Result<Json<DraftView>, ApiError> {
    let kind = parse_kind(&slug)?;
    require_services(kind)?;
    let mut panel = session.panel.lock().await;
    panel.sessions.services.add_point().map_err(ApiError::from_err)?;
    Ok(Json(panel.draft(kind)))
}

#[derive(Deserialize)]
pub struct PointBody {
    pub text: String,
}

/// `PUT /api/admin/services/draft/points/{index}`
pub async fn set_point(
    session: AdminSession,
    Path((slug, index)): Path<(String, usize)>,
    Json(body): Json<PointBody>,
) -> Result<Json<DraftView>, ApiError> {
    let kind = parse_kind(&slug)?;
    require_services(kind)?;
    let mut panel = session.panel.lock().await;
    panel.sessions.services.set_point(index, body.text).map_err(ApiError::from_err)?;
    Ok(Json(panel.draft(kind)))
}

/// `DELETE /api/admin/services/draft/points/{index}`
pub async fn remove_point(
    session: AdminSession,
    Path((slug, index)): Path<(String, usize)>,
) -> Result<Json<DraftView>, ApiError> {
    let kind = parse_kind(&slug)?;
    require_services(kind)?;
    let mut panel = session.panel.lock().await;
    panel.sessions.services.remove_point(index).map_err(ApiError::from_err)?;
    Ok(Json(panel.draft(kind)))
}

// =============================================================================
// RECORDS
// =============================================================================

/// `POST /api/admin/{kind}/records/{id}/edit`: open a cached record.
pub async fn edit_record(
    session: AdminSession,
    Path((slug, id)): Path<(String, Uuid)>,
) -> Result<Json<DraftView>, ApiError> {
    let kind = parse_kind(&slug)?;
    let mut panel = session.panel.lock().await;
    panel.begin_edit(kind, id).map(Json).map_err(ApiError::from_err)
}

/// `DELETE /api/admin/{kind}/records/{id}`
pub async fn delete_record(
    session: AdminSession,
    Path((slug, id)): Path<(String, Uuid)>,
) -> Result<Json<ContentResponse>, ApiError> {
    let kind = parse_kind(&slug)?;
    let mut panel = session.panel.lock().await;
    let report = panel.delete(kind, id).await.map_err(ApiError::from_err)?;
    Ok(content_response(&panel, report))
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
