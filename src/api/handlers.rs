use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::domain::value_objects::MatchId;
use crate::ports::projection_store::ProjectionStore;

use super::types::{ErrorResponse, EventIdsRequest, EventResponse, EventsByGameQuery};

/// APIハンドラーの共有状態
///
/// 読み取り専用のクエリ面に必要な依存関係を保持する。
#[derive(Clone)]
pub struct ApiState {
    pub projection_store: Arc<dyn ProjectionStore>,
}

/// GET /events_by_game_id?game_id=… - 試合の全投影行を取得
///
/// 行が1件もない試合は404を返す。
pub async fn events_by_game_id(
    State(state): State<ApiState>,
    Query(query): Query<EventsByGameQuery>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let game_id = query
        .game_id
        .ok_or_else(|| AppError::BadRequest("game_id query parameter is required".to_string()))?;

    let match_id = MatchId::new(game_id);
    let rows = state
        .projection_store
        .load_by_match(&match_id)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    if rows.is_empty() {
        return Err(AppError::NotFound(format!(
            "no events for game {}",
            match_id
        )));
    }

    Ok(Json(rows.into_iter().map(EventResponse::from).collect()))
}

/// POST /events_by_ids - イベントID集合で投影行を取得
///
/// 見つからないIDは結果から単に欠落する。
pub async fn events_by_ids(
    State(state): State<ApiState>,
    Json(request): Json<EventIdsRequest>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let rows = state
        .projection_store
        .load_by_ids(&request.event_ids)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(Json(rows.into_iter().map(EventResponse::from).collect()))
}

/// APIハンドラー用のアプリケーションエラー型
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InternalError(msg) => {
                // 内部エラーの詳細はログに記録し、クライアントには
                // 一般的なメッセージのみを返す
                tracing::error!("projection store error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_message));
        (status, body).into_response()
    }
}
