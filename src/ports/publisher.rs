use crate::domain::value_objects::MatchId;
use crate::ports::projection_store::ProjectionRow;
use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 配信メッセージ種別
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// 読み取りモデルの更新
    Update,
    /// 試合ストリームの終了。1回の実行につき1度だけ送る。
    Stop,
}

impl MessageType {
    /// メッセージヘッダ用の文字列表現
    #[allow(dead_code)]
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Update => "update",
            MessageType::Stop => "stop",
        }
    }
}

/// 配信ポート
///
/// 試合ごとのルーティングでメッセージバスへ型付きメッセージを送る。
/// 配信はat-least-once：下流は `event_id` をキーに冪等に処理すること。
/// ブローカークライアント自体はこのポートの外側の責務。
#[allow(dead_code)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// 現在の読み取りモデル全体をバスへ配信する
    ///
    /// ペイロードは投影行のJSON配列。ヘッダに
    /// `{match_id, message_type, timestamp}` が載る。
    async fn publish(
        &self,
        match_id: &MatchId,
        message_type: MessageType,
        rows: &[ProjectionRow],
    ) -> Result<()>;
}
