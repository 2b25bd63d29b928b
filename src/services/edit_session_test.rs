use serde_json::json;

use super::*;
use crate::content::{
    GalleryFields, GalleryKind, HeroKind, ReviewKind, ServiceFields, WorkshopFields, WorkshopKind,
};
use crate::services::sync::fetch_snapshot;
use crate::state::test_helpers::{FailingAssets, FixedUrlAssets, flaky_repo, memory_repo, png_upload};

fn titled_service(title: &str) -> ServiceFields {
    ServiceFields { title: Some(title.into()), ..ServiceFields::default() }
}

// =============================================================================
// transitions
// =============================================================================

#[test]
fn new_session_is_idle() {
    let session = EditSession::<ServiceKind>::new();
    assert_eq!(session.state(), &SessionState::Idle);
    assert!(session.draft().is_none());
}

#[test]
fn begin_new_uses_kind_defaults() {
    let mut session = EditSession::<ServiceKind>::new();
    session.begin_new();
    assert_eq!(session.state(), &SessionState::New { fields: ServiceKind::draft_defaults() });
}

#[test]
fn cancel_returns_to_idle() {
    let mut session = EditSession::<ReviewKind>::new();
    session.begin_new();
    session.cancel();
    assert_eq!(session.state(), &SessionState::Idle);
}

#[test]
fn begin_new_while_drafting_replaces_draft() {
    let mut session = EditSession::<ServiceKind>::new();
    session.begin_new();
    session.apply_patch(&titled_service("Unsaved")).unwrap();
    session.begin_new();
    assert_eq!(session.draft(), Some(&ServiceKind::draft_defaults()));
}

#[test]
fn patch_while_idle_is_rejected() {
    let mut session = EditSession::<ServiceKind>::new();
    let err = session.apply_patch(&titled_service("x")).unwrap_err();
    assert!(matches!(err, SessionError::NotDrafting(EntityKind::Service)));
}

#[test]
fn patch_merges_into_draft() {
    let mut session = EditSession::<ServiceKind>::new();
    session.begin_new();
    session.apply_patch(&titled_service("Reiki")).unwrap();
    session
        .apply_patch(&ServiceFields { description: Some("Energy".into()), ..ServiceFields::default() })
        .unwrap();

    let draft = session.draft().unwrap();
    assert_eq!(draft.title.as_deref(), Some("Reiki"));
    assert_eq!(draft.description.as_deref(), Some("Energy"));
    assert_eq!(draft.points, Some(vec![String::new()]));
}

// =============================================================================
// save
// =============================================================================

#[tokio::test]
async fn save_new_creates_and_returns_to_idle() {
    let repo = memory_repo();
    let mut session = EditSession::<ServiceKind>::new();
    session.begin_new();
    session.apply_patch(&titled_service("Yoga Therapy")).unwrap();

    let record = session.save(&repo).await.unwrap();
    assert_eq!(record.title, "Yoga Therapy");
    assert_eq!(record.points, vec![String::new()]);
    assert_eq!(session.state(), &SessionState::Idle);
    assert_eq!(repo.list::<ServiceKind>().await.unwrap().len(), 1);
}

#[tokio::test]
async fn save_existing_updates_record() {
    let repo = memory_repo();
    let original = repo.create::<ServiceKind>(titled_service("Reiki")).await.unwrap();

    let mut session = EditSession::<ServiceKind>::new();
    session.begin_edit(&original);
    assert!(matches!(session.state(), SessionState::Existing { id, .. } if *id == original.id));

    session.apply_patch(&ServiceFields { modal_content: Some("Long form".into()), ..ServiceFields::default() }).unwrap();
    let saved = session.save(&repo).await.unwrap();

    assert_eq!(saved.id, original.id);
    assert_eq!(saved.modal_content, "Long form");
    assert_eq!(saved.title, "Reiki");
    assert_eq!(repo.list::<ServiceKind>().await.unwrap().len(), 1);
}

#[tokio::test]
async fn save_while_idle_fails() {
    let mut session = EditSession::<HeroKind>::new();
    let err = session.save(&memory_repo()).await.unwrap_err();
    assert!(matches!(err, SessionError::NotDrafting(EntityKind::HeroSection)));
}

#[tokio::test]
async fn validation_failure_keeps_draft_and_state() {
    let repo = memory_repo();
    let mut session = EditSession::<ServiceKind>::new();
    session.begin_new();
    session
        .apply_patch(&ServiceFields { description: Some("no title yet".into()), ..ServiceFields::default() })
        .unwrap();
    let before = session.state().clone();

    let err = session.save(&repo).await.unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(session.state(), &before);
    assert!(session.last_error().is_some());
    assert!(repo.list::<ServiceKind>().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_failure_keeps_existing_draft() {
    let (store, repo) = flaky_repo();
    let original = repo.create::<ServiceKind>(titled_service("Reiki")).await.unwrap();

    let mut session = EditSession::<ServiceKind>::new();
    session.begin_edit(&original);
    session.apply_patch(&titled_service("Reiki II")).unwrap();
    let before = session.state().clone();

    store.fail_writes(true);
    let err = session.save(&repo).await.unwrap_err();
    assert!(matches!(err, SessionError::Repository(_)));
    assert_eq!(err.error_code(), "E_STORE_UNAVAILABLE");
    assert_eq!(session.state(), &before);

    store.fail_writes(false);
    let saved = session.save(&repo).await.unwrap();
    assert_eq!(saved.title, "Reiki II");
    assert!(session.last_error().is_none());
}

// =============================================================================
// service points
// =============================================================================

#[test]
fn points_add_edit_remove() {
    let mut session = EditSession::<ServiceKind>::new();
    session.begin_new();

    assert_eq!(session.add_point().unwrap(), 1);
    session.set_point(0, "flexibility".into()).unwrap();
    session.set_point(1, "calm".into()).unwrap();
    assert_eq!(session.draft().unwrap().points, Some(vec!["flexibility".to_string(), "calm".to_string()]));

    session.remove_point(0).unwrap();
    assert_eq!(session.draft().unwrap().points, Some(vec!["calm".to_string()]));
}

#[test]
fn points_out_of_range_are_rejected() {
    let mut session = EditSession::<ServiceKind>::new();
    session.begin_new();

    let err = session.set_point(3, "x".into()).unwrap_err();
    assert!(matches!(err, SessionError::PointOutOfRange { index: 3, len: 1 }));
    let err = session.remove_point(1).unwrap_err();
    assert!(matches!(err, SessionError::PointOutOfRange { index: 1, len: 1 }));
    assert_eq!(session.draft().unwrap().points, Some(vec![String::new()]));
}

#[test]
fn points_need_a_draft() {
    let mut session = EditSession::<ServiceKind>::new();
    assert!(matches!(session.add_point(), Err(SessionError::NotDrafting(_))));
}

// =============================================================================
// attach_image
// =============================================================================

#[tokio::test]
async fn upload_sets_image_field() {
    let assets = FixedUrlAssets("https://cdn.example/images/1.png".into());
    let mut session = EditSession::<WorkshopKind>::new();
    session.begin_new();

    let url = session.attach_image(&assets, png_upload()).await.unwrap();
    assert_eq!(url, "https://cdn.example/images/1.png");
    assert_eq!(session.draft().unwrap().image_url.as_deref(), Some("https://cdn.example/images/1.png"));
}

#[tokio::test]
async fn failed_upload_leaves_draft_untouched() {
    let mut session = EditSession::<WorkshopKind>::new();
    session.begin_new();
    session
        .apply_patch(&WorkshopFields {
            title: Some("Sound Bath".into()),
            image_url: Some("https://cdn.example/old.png".into()),
            ..WorkshopFields::default()
        })
        .unwrap();
    let before = session.state().clone();

    let err = session.attach_image(&FailingAssets, png_upload()).await.unwrap_err();
    assert!(matches!(err, SessionError::Asset(_)));
    assert_eq!(err.error_code(), "E_ASSET_UPLOAD");
    assert_eq!(session.state(), &before);
    assert!(session.last_error().is_some());
}

#[tokio::test]
async fn upload_to_kind_without_image_is_rejected() {
    let assets = FixedUrlAssets("https://cdn.example/x.png".into());
    let mut session = EditSession::<ServiceKind>::new();
    session.begin_new();
    let err = session.attach_image(&assets, png_upload()).await.unwrap_err();
    assert!(matches!(err, SessionError::NoImageField(EntityKind::Service)));
}

#[tokio::test]
async fn gallery_save_without_image_never_persists_empty_reference() {
    let repo = memory_repo();
    let mut session = EditSession::<GalleryKind>::new();
    session.begin_new();
    session.apply_patch(&GalleryFields { alt_text: Some("Studio".into()), ..GalleryFields::default() }).unwrap();

    let err = session.save(&repo).await.unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert!(repo.list::<GalleryKind>().await.unwrap().is_empty());

    let assets = FixedUrlAssets("https://cdn.example/images/2.png".into());
    session.attach_image(&assets, png_upload()).await.unwrap();
    let saved = session.save(&repo).await.unwrap();
    assert_eq!(saved.image_url, "https://cdn.example/images/2.png");
}

// =============================================================================
// KindEditor
// =============================================================================

#[tokio::test]
async fn editor_begin_edit_reads_from_snapshot() {
    let repo = memory_repo();
    let record = repo.create::<ServiceKind>(titled_service("Reiki")).await.unwrap();
    let snapshot = fetch_snapshot(&repo).await.unwrap();

    let mut session = EditSession::<ServiceKind>::new();
    let editor: &mut dyn KindEditor = &mut session;
    editor.begin_edit(&snapshot, record.id).unwrap();

    let view = editor.view();
    assert_eq!(view.state, DraftState::Existing);
    assert_eq!(view.id, Some(record.id));
    assert_eq!(view.fields.unwrap()["title"], "Reiki");
}

#[tokio::test]
async fn editor_begin_edit_unknown_record() {
    let snapshot = ContentSnapshot::default();
    let mut session = EditSession::<ReviewKind>::new();
    let editor: &mut dyn KindEditor = &mut session;
    let err = editor.begin_edit(&snapshot, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, SessionError::RecordNotCached { kind: EntityKind::Review, .. }));
}

#[test]
fn editor_apply_json_patches_and_ignores_unknown_keys() {
    let mut session = EditSession::<ServiceKind>::new();
    let editor: &mut dyn KindEditor = &mut session;
    editor.begin_new();
    editor.apply_json(json!({"title": "Reiki", "unrelated": true})).unwrap();
    assert_eq!(editor.view().fields.unwrap()["title"], "Reiki");
}

#[test]
fn editor_apply_json_rejects_wrong_types() {
    let mut session = EditSession::<ReviewKind>::new();
    let editor: &mut dyn KindEditor = &mut session;
    editor.begin_new();
    let err = editor.apply_json(json!({"rating": "five"})).unwrap_err();
    assert!(matches!(err, SessionError::InvalidPatch { kind: EntityKind::Review, .. }));
    assert_eq!(editor.view().fields.unwrap()["rating"], 5);
}

#[test]
fn idle_view_has_no_fields() {
    let session = EditSession::<WorkshopKind>::new();
    let view = KindEditor::view(&session);
    assert_eq!(view.state, DraftState::Idle);
    assert!(view.fields.is_none());
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json, json!({"kind": "workshop", "state": "idle"}));
}
