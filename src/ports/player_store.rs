use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 選手レコード（参照データ、最小限）
///
/// フォールバックの自己修復が未知の選手を発見したときに書き込む。
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: String,
    pub team_id: String,
    pub first_name: String,
    pub last_name: String,
    pub match_name: String,
    pub shirt_number: Option<i32>,
}

/// チームレコード（参照データ、最小限）
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team_id: String,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub official_name: Option<String>,
    pub country: Option<String>,
}

/// 選手・チーム参照データポート
#[allow(dead_code)]
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// 選手レコードをupsertする
    ///
    /// 既存の選手は最新の情報で上書きされる。
    async fn upsert_player(&self, player: PlayerRecord) -> Result<()>;

    /// チームレコードをupsertする
    async fn upsert_team(&self, team: TeamRecord) -> Result<()>;

    /// チームの選手一覧を取得する
    async fn load_players_by_team(&self, team_id: &str) -> Result<Vec<PlayerRecord>>;
}
