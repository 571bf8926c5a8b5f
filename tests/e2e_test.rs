use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use matchstream::adapters::mock::projection_store::ProjectionStore as MockProjectionStore;
use matchstream::api::handlers::ApiState;
use matchstream::api::router::create_router;
use matchstream::api::types::{ErrorResponse, EventIdsRequest, EventResponse};
use matchstream::domain::value_objects::{MatchId, Qualifier};
use matchstream::ports::projection_store::{ProjectionRow, ProjectionStore};
use tower::ServiceExt;

// ============================================================================
// クエリ面のE2Eテスト（モック投影ストア + 実ルーター）
// ============================================================================

fn sample_row(match_id: &str, event_id: i64) -> ProjectionRow {
    ProjectionRow {
        match_id: MatchId::new(match_id),
        event_id,
        local_event_id: Some(1),
        type_id: Some(34),
        period_id: Some(1),
        time_min: Some(0),
        time_sec: Some(0),
        contestant_id: Some("H".into()),
        player_id: Some("p1".into()),
        player_name: Some("J. Doe".into()),
        outcome: Some(1),
        x: Some(50.0),
        y: Some(50.0),
        qualifiers: vec![Qualifier::new(140, Some("p3".into()))],
        time_stamp: Some("2024-12-30T20:07:18.992Z".into()),
        last_modified: Some("2024-12-31T03:28:08Z".into()),
    }
}

/// 投影行をシードしたアプリケーションを組み立てる
async fn setup_app(rows: Vec<ProjectionRow>) -> axum::Router {
    let projection_store = Arc::new(MockProjectionStore::new());
    projection_store.upsert_many(rows).await.unwrap();

    create_router(ApiState { projection_store })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app(vec![]).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_events_by_game_id_returns_rows() {
    let app = setup_app(vec![sample_row("m1", 1001), sample_row("m1", 1003)]).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/events_by_game_id?game_id=m1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let events: Vec<EventResponse> = serde_json::from_slice(&body).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_id, 1001);
    assert_eq!(events[0].match_id, "m1");
    assert_eq!(events[0].qualifiers.len(), 1);
}

#[tokio::test]
async fn test_events_by_game_id_unknown_match_is_404() {
    let app = setup_app(vec![sample_row("m1", 1001)]).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/events_by_game_id?game_id=unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert!(error.error.contains("unknown"));
}

#[tokio::test]
async fn test_events_by_game_id_missing_param_is_400() {
    let app = setup_app(vec![]).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/events_by_game_id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_events_by_ids_returns_matching_subset() {
    let app = setup_app(vec![
        sample_row("m1", 1001),
        sample_row("m1", 1003),
        sample_row("m2", 2001),
    ])
    .await;

    let request_body = EventIdsRequest {
        event_ids: vec![1001, 2001, 9999],
    };
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events_by_ids")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&request_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let events: Vec<EventResponse> = serde_json::from_slice(&body).unwrap();

    // 見つかった2件だけが返り、9999 は単に欠落する
    assert_eq!(events.len(), 2);
    let ids: Vec<i64> = events.iter().map(|e| e.event_id).collect();
    assert!(ids.contains(&1001));
    assert!(ids.contains(&2001));
}

#[tokio::test]
async fn test_events_by_ids_empty_set_returns_empty_array() {
    let app = setup_app(vec![sample_row("m1", 1001)]).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/events_by_ids")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"event_ids": []}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let events: Vec<EventResponse> = serde_json::from_slice(&body).unwrap();
    assert!(events.is_empty());
}
