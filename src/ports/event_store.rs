use crate::domain::events::DomainEvent;
use crate::domain::value_objects::MatchId;
use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// イベントストアポート
///
/// ドメインイベントの永続化と取得を抽象化する。
/// イベントは追記専用ログに保存される不変の事実。
/// 本番用のデータベース実装とリプレイ・テスト用のファイル実装があり、
/// どちらも同じ契約を満たす。
#[allow(dead_code)]
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 試合のイベントをバッチで追記する
    ///
    /// バッチ単位でアトミック：全件追記されるか1件も追記されないか。
    /// 空のバッチは何もしない。イベントの順序は保持される。
    async fn append(&self, match_id: &MatchId, events: Vec<DomainEvent>) -> Result<()>;

    /// 試合のすべてのイベントを読み込む
    ///
    /// `occurred_on` 昇順、同時刻は挿入順で返す。
    /// 集約状態の復元とリプレイに使用される。
    async fn load(&self, match_id: &MatchId) -> Result<Vec<DomainEvent>>;

    /// 試合のイベントをすべて削除する
    ///
    /// 冪等。リプレイハーネスとテストからのみ使用される。
    async fn delete(&self, match_id: &MatchId) -> Result<()>;
}
