use super::*;

#[tokio::test]
async fn panels_start_empty() {
    let state = test_helpers::test_app_state();
    assert!(state.panels.read().await.is_empty());
    assert!(state.panel("missing").await.is_none());
}

#[tokio::test]
async fn insert_then_remove_panel() {
    let state = test_helpers::test_app_state();
    let (panel, report) = AdminPanel::open(state.repo.clone()).await;
    assert!(report.is_complete());

    state.insert_panel("token-a".into(), panel).await;
    assert!(state.panel("token-a").await.is_some());
    assert!(state.remove_panel("token-a").await);
    assert!(!state.remove_panel("token-a").await);
    assert!(state.panel("token-a").await.is_none());
}

#[tokio::test]
async fn clones_share_panels() {
    let state = test_helpers::test_app_state();
    let clone = state.clone();
    let (panel, _) = AdminPanel::open(state.repo.clone()).await;
    state.insert_panel("shared".into(), panel).await;
    assert!(clone.panel("shared").await.is_some());
}

#[tokio::test]
async fn inserting_past_cap_evicts_oldest_panel() {
    let state = test_helpers::test_app_state().with_limits(2, DEFAULT_UPLOAD_MAX_BYTES);
    for token in ["first", "second", "third"] {
        let (panel, _) = AdminPanel::open(state.repo.clone()).await;
        state.insert_panel(token.into(), panel).await;
    }

    assert_eq!(state.panels.read().await.len(), 2);
    assert!(state.panel("first").await.is_none());
    assert!(state.panel("second").await.is_some());
    assert!(state.panel("third").await.is_some());
}

#[test]
fn zero_panel_cap_is_raised_to_one() {
    let state = test_helpers::test_app_state().with_limits(0, 1024);
    assert_eq!(state.max_open_panels, 1);
    assert_eq!(state.upload_max_bytes, 1024);
}
