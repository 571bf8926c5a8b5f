use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::domain::value_objects::MatchId;

use super::errors::{Result, StreamError};
use super::ingestion::{StreamDependencies, run_live_stream};

/// キックオフ何分前からストリームを開始するか
pub const STREAM_LEAD_MINUTES: i64 = 10;

/// カレンダーの先読み範囲（日）
pub const SCHEDULE_HORIZON_DAYS: i64 = 7;

/// 進行中の試合に途中参加できる、キックオフ後の猶予（分）
pub const LATE_START_WINDOW_MINUTES: i64 = 180;

/// 同時に走る試合ストリーム数の既定上限
pub const DEFAULT_MAX_CONCURRENT_STREAMS: usize = 8;

/// スケジューラ設定
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub tournament_id: String,
    /// 取り込みループのポーリング間隔
    pub poll_interval: Duration,
    /// 同時ストリーム数の上限（セマフォのトークン数）
    pub max_concurrent_streams: usize,
}

/// カレンダーエントリ1件に対する判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// ストリーム開始時刻が未来：遅延付きで開始する
    StartAfter(chrono::Duration),
    /// キックオフ済みだが途中参加ウィンドウ内：即時開始
    StartNow,
    /// キックオフが7日より先
    SkipBeyondHorizon,
    /// 途中参加ウィンドウも過ぎている（試合終了とみなす）
    SkipPresumedOver,
}

/// カレンダーの日付・時刻文字列からキックオフ時刻（UTC）を得る
///
/// `date` は "2024-08-17Z"、`time` は "14:00:00Z" の形式。
pub fn parse_kickoff(date: &str, time: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    let combined = format!(
        "{}T{}",
        date.trim_end_matches('Z'),
        time.trim_end_matches('Z')
    );
    let naive = NaiveDateTime::parse_from_str(&combined, "%Y-%m-%dT%H:%M:%S")?;
    Ok(naive.and_utc())
}

/// キックオフ時刻と現在時刻からスケジュール判断を下す（純粋な関数）
///
/// 規則：
/// - キックオフが `now + 7日` より先ならスキップ
/// - ストリーム開始時刻（キックオフ10分前）が未来なら遅延開始
/// - `now` がキックオフ後180分以内なら即時開始（途中参加）
/// - それ以外はスキップ（試合は終わっているとみなす）
pub fn decide(kickoff: DateTime<Utc>, now: DateTime<Utc>) -> ScheduleDecision {
    if kickoff > now + chrono::Duration::days(SCHEDULE_HORIZON_DAYS) {
        return ScheduleDecision::SkipBeyondHorizon;
    }

    let stream_start = kickoff - chrono::Duration::minutes(STREAM_LEAD_MINUTES);
    if stream_start > now {
        return ScheduleDecision::StartAfter(stream_start - now);
    }

    if now <= kickoff + chrono::Duration::minutes(LATE_START_WINDOW_MINUTES) {
        return ScheduleDecision::StartNow;
    }

    ScheduleDecision::SkipPresumedOver
}

/// 大会カレンダーを読み、試合ごとの取り込みタスクを起動する
///
/// エントリの日付・時刻が欠けている、または解析できない場合は
/// 警告してスキップする（致命的ではない）。起動されたタスクは
/// セマフォのトークンを取得してから走り、終了時に返却する。
/// タスクの失敗はその試合のログに留まり、他の試合に波及しない。
///
/// スケジューラ自体は状態を持たない：各試合のループが永続化
/// されたイベントログから再開するため、再実行は冪等である。
pub async fn run_scheduler(
    deps: Arc<StreamDependencies>,
    config: SchedulerConfig,
) -> Result<Vec<JoinHandle<()>>> {
    let schedule = deps
        .feed_client
        .fetch_tournament_schedule(&config.tournament_id)
        .await
        .map_err(|source| StreamError::Schedule {
            tournament_id: config.tournament_id.clone(),
            source,
        })?;

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_streams));
    let now = Utc::now();
    let mut handles = Vec::new();

    for match_date in &schedule.match_dates {
        for entry in &match_date.matches {
            let (Some(date), Some(time)) = (
                entry.date.as_deref().filter(|s| !s.is_empty()),
                entry.time.as_deref().filter(|s| !s.is_empty()),
            ) else {
                tracing::warn!(match_id = %entry.id, "calendar entry missing date/time, skipping");
                continue;
            };

            let kickoff = match parse_kickoff(date, time) {
                Ok(kickoff) => kickoff,
                Err(error) => {
                    tracing::warn!(
                        match_id = %entry.id,
                        %error,
                        "calendar entry has unparseable kickoff, skipping"
                    );
                    continue;
                }
            };

            let delay = match decide(kickoff, now) {
                ScheduleDecision::StartAfter(delay) => {
                    tracing::info!(
                        match_id = %entry.id,
                        kickoff = %kickoff,
                        delay_secs = delay.num_seconds(),
                        "match scheduled"
                    );
                    delay.to_std().unwrap_or(Duration::ZERO)
                }
                ScheduleDecision::StartNow => {
                    tracing::info!(
                        match_id = %entry.id,
                        kickoff = %kickoff,
                        "match already underway, starting immediately"
                    );
                    Duration::ZERO
                }
                ScheduleDecision::SkipBeyondHorizon | ScheduleDecision::SkipPresumedOver => {
                    tracing::debug!(match_id = %entry.id, kickoff = %kickoff, "match skipped");
                    continue;
                }
            };

            handles.push(spawn_stream(
                Arc::clone(&deps),
                Arc::clone(&semaphore),
                MatchId::new(entry.id.clone()),
                delay,
                config.poll_interval,
            ));
        }
    }

    tracing::info!(
        tournament_id = %config.tournament_id,
        scheduled = handles.len(),
        "tournament schedule processed"
    );
    Ok(handles)
}

/// 遅延付きで試合ストリームタスクを起動する
///
/// トークンは遅延が明けて実際にストリームが始まる時点で取得する。
fn spawn_stream(
    deps: Arc<StreamDependencies>,
    semaphore: Arc<Semaphore>,
    match_id: MatchId,
    delay: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let _permit = match semaphore.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return, // セマフォが閉じられた＝シャットダウン中
        };

        if let Err(error) = run_live_stream(&deps, match_id.clone(), interval).await {
            tracing::error!(match_id = %match_id, %error, "match stream terminated with error");
        }
    })
}
