use std::sync::Arc;
use std::time::Duration;

use crate::application::queries::MatchProjection;
use crate::domain::match_aggregate::MatchAggregate;
use crate::domain::value_objects::MatchId;
use crate::ports::event_store::EventStore;
use crate::ports::feed_client::FeedClient;
use crate::ports::projection_store::ProjectionStore;
use crate::ports::publisher::{MessageType, Publisher};

use super::errors::{Result, StreamError};

/// ストリーミングサービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct StreamDependencies {
    pub event_store: Arc<dyn EventStore>,
    pub projection_store: Arc<dyn ProjectionStore>,
    pub feed_client: Arc<dyn FeedClient>,
    pub publisher: Arc<dyn Publisher>,
}

/// ポーリング1周期の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    /// この周期で永続化されたドメインイベント数
    pub appended: usize,
    /// 試合終了を観測したか
    pub finished: bool,
}

/// ポーリング1周期分を実行する（純粋な関数）
///
/// 処理順序は1バッチにつき append → upsert → publish を守る：
/// 1. フィードからスナップショットを取得
/// 2. 集約で差分を取りドメインイベントを発行
/// 3. イベントストアへアトミックに追記
/// 4. 未コミットイベントをインメモリ投影へ適用し、クリア
/// 5. 現在状態の全行を投影ストアへupsert
/// 6. 現在状態をバスへ配信
///
/// # 障害時の整合性
///
/// append失敗時は未コミットイベントが集約に残り、次周期で
/// そのまま再追記される。append成功後のupsert/publish失敗は、
/// 毎周期で現在状態の全行をupsert・配信し直すため自然に回復する
/// （upsertはevent_idキーで冪等、下流はevent_idで冪等に処理する）。
pub async fn poll_once(
    deps: &StreamDependencies,
    aggregate: &mut MatchAggregate,
    projection: &mut MatchProjection,
) -> Result<CycleOutcome> {
    let match_id = aggregate.match_id().clone();

    // 1. フィード取得
    let feed = deps
        .feed_client
        .fetch_match_events(&match_id)
        .await
        .map_err(|source| StreamError::Feed {
            match_id: match_id.clone(),
            source,
        })?;

    // 2. 差分検出
    aggregate.ingest_snapshot(&feed.live_data.events);

    // 3. アトミックな追記。成功するまで未コミットは保持される。
    let uncommitted = aggregate.uncommitted().to_vec();
    deps.event_store
        .append(&match_id, uncommitted.clone())
        .await
        .map_err(|source| StreamError::EventStore {
            match_id: match_id.clone(),
            source,
        })?;

    // 4. インメモリ投影の更新
    for event in &uncommitted {
        projection.project(event);
    }
    aggregate.clear_uncommitted();

    // 5. 現在状態のupsert
    let rows = projection.current_rows(&match_id);
    deps.projection_store
        .upsert_many(rows.clone())
        .await
        .map_err(|source| StreamError::ProjectionStore {
            match_id: match_id.clone(),
            source,
        })?;

    // 6. 配信
    deps.publisher
        .publish(&match_id, MessageType::Update, &rows)
        .await
        .map_err(|source| StreamError::Publish {
            match_id: match_id.clone(),
            source,
        })?;

    Ok(CycleOutcome {
        appended: uncommitted.len(),
        finished: aggregate.finished(),
    })
}

/// 試合1件のライブストリームを実行する（純粋な関数）
///
/// 永続化されたイベントログから集約と投影を復元し、試合終了を
/// 観測するまでポーリングを続ける。一時的エラーは警告ログの上で
/// その周期を破棄し、次の周期で再試行する。ループを抜けた後、
/// この実行につき1度だけ `stop` を配信する。
///
/// エラーが試合の境界を越えることはない。復元の失敗と最後の
/// `stop` 配信の失敗だけがこのタスクを終了させる。
pub async fn run_live_stream(
    deps: &StreamDependencies,
    match_id: MatchId,
    interval: Duration,
) -> Result<()> {
    // 集約と投影をイベントログのfoldで復元
    let stored = deps
        .event_store
        .load(&match_id)
        .await
        .map_err(|source| StreamError::EventStore {
            match_id: match_id.clone(),
            source,
        })?;
    let mut aggregate = MatchAggregate::load_from(match_id.clone(), &stored);
    let mut projection = MatchProjection::rebuild_from(&stored);

    tracing::info!(match_id = %match_id, resumed_events = stored.len(), "starting live stream");

    let mut finished = aggregate.finished();
    while !finished {
        match poll_once(deps, &mut aggregate, &mut projection).await {
            Ok(outcome) => {
                if outcome.appended > 0 {
                    tracing::debug!(
                        match_id = %match_id,
                        appended = outcome.appended,
                        "cycle persisted domain events"
                    );
                }
                finished = outcome.finished;
            }
            Err(error) => {
                tracing::warn!(
                    match_id = %match_id,
                    %error,
                    "cycle aborted, retrying next interval"
                );
            }
        }

        if !finished {
            tokio::time::sleep(interval).await;
        }
    }

    // 試合終了の通知
    let rows = projection.current_rows(&match_id);
    deps.publisher
        .publish(&match_id, MessageType::Stop, &rows)
        .await
        .map_err(|source| StreamError::Publish {
            match_id: match_id.clone(),
            source,
        })?;

    tracing::info!(match_id = %match_id, "match finished, stream exiting");
    Ok(())
}
