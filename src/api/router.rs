use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::handlers::{ApiState, events_by_game_id, events_by_ids};

/// 読み取り専用クエリ面のAPIルーターを作成
///
/// クエリエンドポイント:
/// - GET /events_by_game_id?game_id=… - 試合の全投影行
/// - POST /events_by_ids - イベントID集合による取得
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        // ヘルスチェックエンドポイント
        .route("/health", get(health_check))
        // クエリエンドポイント（Read操作）
        .route("/events_by_game_id", get(events_by_game_id))
        .route("/events_by_ids", post(events_by_ids))
        // トレーシングミドルウェアを追加
        .layer(TraceLayer::new_for_http())
        // アプリケーション状態を追加
        .with_state(state)
}

/// ヘルスチェックエンドポイント
async fn health_check() -> &'static str {
    "OK"
}
