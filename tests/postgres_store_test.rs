use matchstream::adapters::postgres::{
    PostgresEventStore, PostgresPlayerStore, PostgresProjectionStore,
};
use matchstream::domain::events::{DomainEvent, DomainEventBody};
use matchstream::domain::match_event::MatchEvent;
use matchstream::domain::value_objects::{MatchId, Qualifier};
use matchstream::ports::event_store::EventStore;
use matchstream::ports::player_store::{PlayerRecord, PlayerStore, TeamRecord};
use matchstream::ports::projection_store::{ProjectionRow, ProjectionStore};
use serial_test::serial;
use std::collections::BTreeMap;
use uuid::Uuid;

mod common;

// ============================================================================
// PostgreSQLアダプターの契約テスト
//
// 実データベースが必要なため #[ignore] 付き。実行するには：
//   DATABASE_URL=postgres://... cargo test -- --ignored
// ============================================================================

fn unique_match_id() -> MatchId {
    MatchId::new(format!("test-{}", Uuid::new_v4().simple()))
}

fn sample_event(match_id: &MatchId, feed_event_id: i64) -> DomainEvent {
    DomainEvent::global_event_added(
        match_id.clone(),
        MatchEvent {
            feed_event_id,
            local_event_id: 1,
            type_id: Some(34),
            period_id: Some(1),
            time_min: Some(0),
            time_sec: Some(0),
            contestant_id: Some("H".into()),
            player_id: Some("p1".into()),
            player_name: None,
            outcome: Some(1),
            x: Some(50.0),
            y: Some(50.0),
            qualifiers: vec![Qualifier::new(140, Some("p3".into()))],
            time_stamp: None,
            last_modified: None,
        },
    )
}

fn sample_row(match_id: &MatchId, event_id: i64, type_id: i32) -> ProjectionRow {
    ProjectionRow {
        match_id: match_id.clone(),
        event_id,
        local_event_id: Some(1),
        type_id: Some(type_id),
        period_id: Some(1),
        time_min: Some(0),
        time_sec: Some(0),
        contestant_id: Some("H".into()),
        player_id: Some("p1".into()),
        player_name: None,
        outcome: Some(1),
        x: Some(50.0),
        y: Some(50.0),
        qualifiers: vec![Qualifier::new(140, Some("p3".into()))],
        time_stamp: None,
        last_modified: None,
    }
}

// ----------------------------------------------------------------------------
// イベントストア契約（ファイル実装と同じ契約を満たすこと）
// ----------------------------------------------------------------------------

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_append_and_load_events() {
    let pool = common::create_test_pool().await;
    let store = PostgresEventStore::new(pool);
    let match_id = unique_match_id();

    let events = vec![sample_event(&match_id, 1001), sample_event(&match_id, 1002)];
    store.append(&match_id, events.clone()).await.unwrap();

    let loaded = store.load(&match_id).await.unwrap();
    assert_eq!(loaded, events);

    store.delete(&match_id).await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_load_nonexistent_aggregate_is_empty() {
    let pool = common::create_test_pool().await;
    let store = PostgresEventStore::new(pool);

    let loaded = store.load(&unique_match_id()).await.unwrap();
    assert!(loaded.is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_append_empty_batch_is_noop() {
    let pool = common::create_test_pool().await;
    let store = PostgresEventStore::new(pool);

    let result = store.append(&unique_match_id(), vec![]).await;
    assert!(result.is_ok());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_events_ordering_across_batches() {
    let pool = common::create_test_pool().await;
    let store = PostgresEventStore::new(pool);
    let match_id = unique_match_id();

    let first = sample_event(&match_id, 1001);
    let mut changed = BTreeMap::new();
    changed.insert("type_id".to_string(), serde_json::json!(3));
    let mut old = BTreeMap::new();
    old.insert("type_id".to_string(), serde_json::json!(34));
    let second = DomainEvent::event_edited(match_id.clone(), 1001, changed, old);

    store.append(&match_id, vec![first.clone()]).await.unwrap();
    store.append(&match_id, vec![second.clone()]).await.unwrap();

    let loaded = store.load(&match_id).await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], first);
    assert_eq!(loaded[1], second);
    match &loaded[1].body {
        DomainEventBody::EventEdited(edited) => {
            assert_eq!(edited.changed_fields["type_id"], serde_json::json!(3));
        }
        other => panic!("Expected EventEdited, got {:?}", other),
    }

    store.delete(&match_id).await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_delete_is_idempotent() {
    let pool = common::create_test_pool().await;
    let store = PostgresEventStore::new(pool);
    let match_id = unique_match_id();

    store
        .append(&match_id, vec![sample_event(&match_id, 1001)])
        .await
        .unwrap();

    store.delete(&match_id).await.unwrap();
    assert!(store.load(&match_id).await.unwrap().is_empty());
    store.delete(&match_id).await.unwrap();
}

// ----------------------------------------------------------------------------
// 投影ストア契約
// ----------------------------------------------------------------------------

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_p4_upsert_idempotence() {
    let pool = common::create_test_pool().await;
    let store = PostgresProjectionStore::new(pool);
    let match_id = unique_match_id();

    let rows = vec![sample_row(&match_id, 91001, 34), sample_row(&match_id, 91002, 65)];

    // 同じバッチを2回upsertしても1回分と同じ状態になる
    store.upsert_many(rows.clone()).await.unwrap();
    store.upsert_many(rows.clone()).await.unwrap();

    let loaded = store.load_by_match(&match_id).await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded, rows);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_upsert_overwrites_by_event_id() {
    let pool = common::create_test_pool().await;
    let store = PostgresProjectionStore::new(pool);
    let match_id = unique_match_id();

    store
        .upsert_many(vec![sample_row(&match_id, 91001, 34)])
        .await
        .unwrap();
    store
        .upsert_many(vec![sample_row(&match_id, 91001, 3)])
        .await
        .unwrap();

    let loaded = store.load_by_match(&match_id).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].type_id, Some(3));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_duplicates_within_batch_keep_first() {
    let pool = common::create_test_pool().await;
    let store = PostgresProjectionStore::new(pool);
    let match_id = unique_match_id();

    // 同一バッチ内の重複は警告の上、先勝ち
    store
        .upsert_many(vec![
            sample_row(&match_id, 91001, 34),
            sample_row(&match_id, 91001, 3),
        ])
        .await
        .unwrap();

    let loaded = store.load_by_match(&match_id).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].type_id, Some(34));
}

// ----------------------------------------------------------------------------
// 選手・チーム参照データ契約
// ----------------------------------------------------------------------------

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_player_upsert_overwrites_roster_data() {
    let pool = common::create_test_pool().await;
    let store = PostgresPlayerStore::new(pool);
    let team_id = format!("team-{}", Uuid::new_v4().simple());
    let player_id = format!("player-{}", Uuid::new_v4().simple());

    store
        .upsert_team(TeamRecord {
            team_id: team_id.clone(),
            name: Some("Home FC".into()),
            short_name: Some("HFC".into()),
            official_name: None,
            country: Some("England".into()),
        })
        .await
        .unwrap();

    store
        .upsert_player(PlayerRecord {
            player_id: player_id.clone(),
            team_id: team_id.clone(),
            first_name: "J.".into(),
            last_name: "Doe".into(),
            match_name: "J. Doe".into(),
            shirt_number: Some(9),
        })
        .await
        .unwrap();

    // 最新のロスター情報で上書きされる
    store
        .upsert_player(PlayerRecord {
            player_id: player_id.clone(),
            team_id: team_id.clone(),
            first_name: "J.".into(),
            last_name: "Doe".into(),
            match_name: "J. Doe".into(),
            shirt_number: Some(10),
        })
        .await
        .unwrap();

    let players = store.load_players_by_team(&team_id).await.unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].player_id, player_id);
    assert_eq!(players[0].shirt_number, Some(10));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running postgres (set DATABASE_URL)"]
async fn test_load_by_ids_returns_subset() {
    let pool = common::create_test_pool().await;
    let store = PostgresProjectionStore::new(pool);
    let match_id = unique_match_id();

    store
        .upsert_many(vec![
            sample_row(&match_id, 91001, 34),
            sample_row(&match_id, 91002, 65),
        ])
        .await
        .unwrap();

    let loaded = store.load_by_ids(&[91001, 99999]).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].event_id, 91001);
}
