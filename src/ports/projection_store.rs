use crate::domain::match_event::MatchEvent;
use crate::domain::value_objects::{MatchId, Qualifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 投影行（Read Model）
///
/// クエリに最適化された非正規化ビュー（CQRSパターン）。
/// `event_id` はフィード提供元のグローバルイベントIDで、
/// 実運用上は試合をまたいで一意。
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub match_id: MatchId,
    pub event_id: i64,
    pub local_event_id: Option<i32>,
    pub type_id: Option<i32>,
    pub period_id: Option<i32>,
    pub time_min: Option<i32>,
    pub time_sec: Option<i32>,
    pub contestant_id: Option<String>,
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub outcome: Option<i32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub qualifiers: Vec<Qualifier>,
    pub time_stamp: Option<String>,
    pub last_modified: Option<String>,
}

impl ProjectionRow {
    /// 読み取りモデルのイベントから投影行を組み立てる
    pub fn from_event(match_id: MatchId, event: &MatchEvent) -> Self {
        Self {
            match_id,
            event_id: event.feed_event_id,
            local_event_id: Some(event.local_event_id),
            type_id: event.type_id,
            period_id: event.period_id,
            time_min: event.time_min,
            time_sec: event.time_sec,
            contestant_id: event.contestant_id.clone(),
            player_id: event.player_id.clone(),
            player_name: event.player_name.clone(),
            outcome: event.outcome,
            x: event.x,
            y: event.y,
            qualifiers: event.qualifiers.clone(),
            time_stamp: event.time_stamp.clone(),
            last_modified: event.last_modified.clone(),
        }
    }
}

/// 投影ストアポート
#[allow(dead_code)]
#[async_trait]
pub trait ProjectionStore: Send + Sync {
    /// 投影行をバッチでupsertする
    ///
    /// `event_id` をキーとし、繰り返しupsertしても行は重複しない。
    /// バッチ内に同じ `event_id` が複数あれば警告して先勝ちで残す。
    /// バッチ全体が1トランザクションで適用される。
    async fn upsert_many(&self, rows: Vec<ProjectionRow>) -> Result<()>;

    /// 試合の全投影行を取得する
    async fn load_by_match(&self, match_id: &MatchId) -> Result<Vec<ProjectionRow>>;

    /// イベントID集合で投影行を取得する
    ///
    /// 見つからないIDは結果から単に欠落する。
    async fn load_by_ids(&self, event_ids: &[i64]) -> Result<Vec<ProjectionRow>>;
}
