use crate::domain::match_event::FeedEvent;
use crate::domain::value_objects::MatchId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 試合イベントフィードのレスポンス形式
///
/// `{liveData: {event: [...]}}` の外形。HTTPやOAuthの詳細は
/// このポートの外側（外部協力者）の責務。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchEventsFeed {
    #[serde(default, rename = "liveData")]
    pub live_data: LiveData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveData {
    #[serde(default, rename = "event")]
    pub events: Vec<FeedEvent>,
}

/// 大会カレンダーのレスポンス形式
///
/// `{matchDate: [{match: [{id, date, time}]}]}` の外形。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentSchedule {
    #[serde(default, rename = "matchDate")]
    pub match_dates: Vec<MatchDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchDate {
    #[serde(default, rename = "match")]
    pub matches: Vec<FixtureEntry>,
}

/// カレンダー上の1試合
///
/// `date` は "YYYY-MM-DDZ"、`time` は "HH:MM:SSZ" 形式（UTC）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureEntry {
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// 上流フィードクライアントポート
#[allow(dead_code)]
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// 試合の現在のイベントスナップショットを取得する
    ///
    /// フィードは毎回、その時点で既知の全イベントを含む
    /// 全量スナップショットを返す。
    async fn fetch_match_events(&self, match_id: &MatchId) -> Result<MatchEventsFeed>;

    /// 大会のカレンダーを取得する
    async fn fetch_tournament_schedule(&self, tournament_id: &str) -> Result<TournamentSchedule>;
}
