use crate::domain::value_objects::MatchId;
use thiserror::Error;

/// ポート層から伝播する I/O エラー
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// ストリーミングアプリケーション層のエラー
///
/// ポートの失敗を試合の文脈付きで包む。取り込みループにとっては
/// いずれも一時的エラーであり、次のポーリング周期で再試行される。
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum StreamError {
    /// フィード取得の失敗
    #[error("feed fetch failed for match {match_id}: {source}")]
    Feed {
        match_id: MatchId,
        source: PortError,
    },

    /// イベントストアへの追記・読み込みの失敗
    #[error("event store operation failed for match {match_id}: {source}")]
    EventStore {
        match_id: MatchId,
        source: PortError,
    },

    /// 投影ストアへのupsertの失敗
    #[error("projection store operation failed for match {match_id}: {source}")]
    ProjectionStore {
        match_id: MatchId,
        source: PortError,
    },

    /// バスへの配信の失敗
    #[error("publish failed for match {match_id}: {source}")]
    Publish {
        match_id: MatchId,
        source: PortError,
    },

    /// 大会カレンダー取得の失敗
    #[error("tournament schedule fetch failed for {tournament_id}: {source}")]
    Schedule {
        tournament_id: String,
        source: PortError,
    },

    /// リプレイ速度が不正
    #[error("replay speed must be positive, got {0}")]
    InvalidReplaySpeed(f64),
}

/// ストリーミングアプリケーション層の Result型
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, StreamError>;
