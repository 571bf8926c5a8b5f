use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Qualifier;
use crate::ports::projection_store::ProjectionRow;

/// GET /events_by_game_id のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct EventsByGameQuery {
    /// 対象試合のID
    pub game_id: Option<String>,
}

/// POST /events_by_ids のリクエストボディ
#[derive(Debug, Serialize, Deserialize)]
pub struct EventIdsRequest {
    pub event_ids: Vec<i64>,
}

/// 投影行のレスポンス表現
#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub match_id: String,
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

impl From<ProjectionRow> for EventResponse {
    fn from(row: ProjectionRow) -> Self {
        Self {
            match_id: row.match_id.value().to_string(),
            event_id: row.event_id,
            local_event_id: row.local_event_id,
            type_id: row.type_id,
            period_id: row.period_id,
            time_min: row.time_min,
            time_sec: row.time_sec,
            contestant_id: row.contestant_id,
            player_id: row.player_id,
            player_name: row.player_name,
            outcome: row.outcome,
            x: row.x,
            y: row.y,
            qualifiers: row.qualifiers,
            time_stamp: row.time_stamp,
            last_modified: row.last_modified,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
