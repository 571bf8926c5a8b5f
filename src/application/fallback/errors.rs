use thiserror::Error;

/// ポート層から伝播する I/O エラー
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// フォールバック取り込みのエラー
///
/// ペイロードの解析失敗とmatch/teamマッピングの欠落は致命的。
/// 選手マッピングの欠落は自己修復で回復し、それでも残る場合は
/// 該当イベントだけをスキップする。
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum FallbackError {
    /// ページソースの修復・解析の失敗（この実行全体が失敗する）
    #[error("failed to parse fallback payload: {0}")]
    MalformedPayload(String),

    /// 必須IDマッピングの欠落
    #[error("missing {namespace} mapping for external id {external_id}")]
    MappingMissing {
        namespace: &'static str,
        external_id: String,
    },

    /// 自己修復後も選手マッピングが見つからない
    #[error("player {external_id} still unmapped after self-healing")]
    PlayerUnmapped { external_id: String },

    /// イベントにグローバルIDがない
    #[error("scraped event has no id")]
    MissingEventId,

    /// チームの初期フォーメーションがない
    #[error("no formation for team {team_id}")]
    MissingFormation { team_id: String },

    /// マッピング永続化の失敗
    #[error("mapping store error: {0}")]
    MappingStore(PortError),

    /// 選手レコード書き込みの失敗
    #[error("player store error: {0}")]
    PlayerStore(PortError),

    /// 投影行upsertの失敗
    #[error("projection store error: {0}")]
    ProjectionStore(PortError),

    /// バス配信の失敗
    #[error("publish error: {0}")]
    Publish(PortError),
}

/// フォールバック層の Result型
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, FallbackError>;
