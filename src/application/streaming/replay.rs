use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::application::queries::MatchProjection;
use crate::domain::value_objects::MatchId;
use crate::ports::event_store::EventStore;
use crate::ports::publisher::{MessageType, Publisher};

use super::errors::{Result, StreamError};

/// 試合後の遅延編集ウィンドウ
///
/// 仮想経過がこの長さを超えたら、残りのイベントは実時間スケール
/// ではなく一括で処理する（編集は試合後24時間以上続くことがある）。
pub const POST_MATCH_WINDOW_HOURS: i64 = 2;

/// リプレイの依存関係
#[derive(Clone)]
pub struct ReplayDependencies {
    pub event_store: Arc<dyn EventStore>,
    pub publisher: Arc<dyn Publisher>,
}

/// 仮想時計
///
/// 実時間の `speed` 倍で進む模擬時刻。リプレイはこの時計を
/// ドメインイベント列の先頭時刻に合わせて開始する。
#[derive(Debug)]
pub struct VirtualClock {
    start_sim: DateTime<Utc>,
    anchored_at: Instant,
    speed: f64,
}

impl VirtualClock {
    pub fn new(start_sim: DateTime<Utc>, speed: f64) -> Self {
        Self {
            start_sim,
            anchored_at: Instant::now(),
            speed,
        }
    }

    /// 現在の仮想時刻
    pub fn now(&self) -> DateTime<Utc> {
        self.start_sim + self.virtual_elapsed()
    }

    /// 開始からの仮想経過時間
    pub fn virtual_elapsed(&self) -> chrono::Duration {
        let real_elapsed = self.anchored_at.elapsed().as_secs_f64();
        chrono::Duration::milliseconds((real_elapsed * self.speed * 1000.0) as i64)
    }
}

/// イベントログから配信ストリームを再構築する（純粋な関数）
///
/// 1. 試合の全ドメインイベントを読み込む
/// 2. 仮想時計を先頭イベントの `occurred_on` に合わせる
/// 3. `push_interval / speed` 秒の実時間ごとに、仮想時刻まで
///    成熟したイベント接頭辞を新しい投影へfoldし、`update` を配信
/// 4. 仮想経過が2時間を超えるかログが尽きたら、残りを一括で
///    処理して `stop` を配信
///
/// 配信される接頭辞は単調に伸び、最終状態はストアのfoldに等しい。
pub async fn replay_match(
    deps: &ReplayDependencies,
    match_id: MatchId,
    speed: f64,
    push_interval: Duration,
) -> Result<()> {
    if speed <= 0.0 {
        return Err(StreamError::InvalidReplaySpeed(speed));
    }

    let events = deps
        .event_store
        .load(&match_id)
        .await
        .map_err(|source| StreamError::EventStore {
            match_id: match_id.clone(),
            source,
        })?;

    if events.is_empty() {
        tracing::info!(match_id = %match_id, "no domain events to replay");
        return Ok(());
    }

    tracing::info!(
        match_id = %match_id,
        events = events.len(),
        speed,
        "starting replay"
    );

    // 先頭イベントを試合開始とみなす
    let clock = VirtualClock::new(events[0].occurred_on, speed);
    let mut projection = MatchProjection::new();
    let tick = Duration::from_secs_f64(push_interval.as_secs_f64() / speed);
    let mut cursor = 0;

    while cursor < events.len() {
        tokio::time::sleep(tick).await;

        let flush_all =
            clock.virtual_elapsed() >= chrono::Duration::hours(POST_MATCH_WINDOW_HOURS);
        let virtual_now = clock.now();

        let end = if flush_all {
            events.len()
        } else {
            let mut end = cursor;
            while end < events.len() && events[end].occurred_on <= virtual_now {
                end += 1;
            }
            end
        };

        for event in &events[cursor..end] {
            projection.project(event);
        }
        cursor = end;

        let rows = projection.current_rows(&match_id);
        let message_type = if cursor < events.len() {
            MessageType::Update
        } else {
            MessageType::Stop
        };

        deps.publisher
            .publish(&match_id, message_type, &rows)
            .await
            .map_err(|source| StreamError::Publish {
                match_id: match_id.clone(),
                source,
            })?;
    }

    tracing::info!(match_id = %match_id, "replay finished");
    Ok(())
}
