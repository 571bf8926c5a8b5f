#![allow(dead_code)]

use std::collections::HashMap;

use super::events::{DomainEvent, DomainEventBody};
use super::match_event::{FeedEvent, FieldError, MatchEvent};
use super::value_objects::MatchId;

/// 試合集約 - ポーリングされたスナップショットを単調なドメイン
/// イベント列へ変換するインメモリ状態
///
/// イベントソーシングの原則：
/// - 状態は永続化されたドメインイベント列のfoldに等しい
/// - スナップショットとの差分だけが新しい事実になる
/// - 未コミットのイベントはappend成功まで保持される
#[derive(Debug)]
pub struct MatchAggregate {
    match_id: MatchId,
    /// feed_event_id → 現在値
    events: HashMap<i64, MatchEvent>,
    /// まだ永続化されていないドメインイベント
    uncommitted: Vec<DomainEvent>,
    /// 試合終了フラグ。一度trueになったら戻らない。
    finished: bool,
}

impl MatchAggregate {
    pub fn new(match_id: MatchId) -> Self {
        Self {
            match_id,
            events: HashMap::new(),
            uncommitted: Vec::new(),
            finished: false,
        }
    }

    /// 永続化されたイベント列から状態を復元する
    ///
    /// `occurred_on` 昇順（挿入順タイブレーク）で渡されること。
    pub fn load_from(match_id: MatchId, stored: &[DomainEvent]) -> Self {
        let mut agg = Self::new(match_id);
        for event in stored {
            agg.apply(event);
        }
        agg
    }

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    pub fn event(&self, feed_event_id: i64) -> Option<&MatchEvent> {
        self.events.get(&feed_event_id)
    }

    pub fn events(&self) -> &HashMap<i64, MatchEvent> {
        &self.events
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn uncommitted(&self) -> &[DomainEvent] {
        &self.uncommitted
    }

    /// append成功後にのみ呼ぶこと。失敗時に呼ぶと差分が失われる。
    pub fn clear_uncommitted(&mut self) {
        self.uncommitted.clear();
    }

    // ------------------------------------------------------------------
    // APPLY：ドメインイベントをインメモリ状態へ反映する
    // ------------------------------------------------------------------

    /// ドメインイベントを状態へ適用する
    ///
    /// 復元時（load_from）と記録時（record）の両方で使われる。
    pub fn apply(&mut self, event: &DomainEvent) {
        match &event.body {
            DomainEventBody::GlobalEventAdded(added) => {
                self.events.insert(added.feed_event_id, added.clone());
                if added.is_match_end() {
                    self.finished = true;
                }
            }
            DomainEventBody::EventEdited(edited) => {
                let Some(existing) = self.events.get_mut(&edited.feed_event_id) else {
                    tracing::warn!(
                        match_id = %self.match_id,
                        feed_event_id = edited.feed_event_id,
                        "edit for unknown feed event ignored"
                    );
                    return;
                };

                for (field, value) in &edited.changed_fields {
                    match existing.set_field(field, value) {
                        Ok(()) => {}
                        Err(FieldError::Unknown(name)) => {
                            tracing::warn!(
                                match_id = %self.match_id,
                                feed_event_id = edited.feed_event_id,
                                field = %name,
                                "unknown field in edit ignored"
                            );
                        }
                        Err(FieldError::InvalidValue { field, value }) => {
                            tracing::warn!(
                                match_id = %self.match_id,
                                feed_event_id = edited.feed_event_id,
                                field = %field,
                                %value,
                                "invalid value in edit ignored"
                            );
                        }
                    }
                }

                if self.events[&edited.feed_event_id].is_match_end() {
                    self.finished = true;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // INGEST：スナップショットとの差分からドメインイベントを発行する
    // ------------------------------------------------------------------

    /// スナップショット1回分を取り込む
    ///
    /// イベントは受信順に処理される。同一スナップショット内に同じ
    /// feed_event_idが二度現れた場合、二度目は一度目が作った状態に
    /// 対して再差分される。`id` / `eventId` を欠く不正形イベントは
    /// 警告して捨てる。整形済みイベントからは決して失敗しない。
    pub fn ingest_snapshot(&mut self, raw_events: &[FeedEvent]) {
        for raw in raw_events {
            let Some(incoming) = MatchEvent::from_feed(raw) else {
                tracing::warn!(
                    match_id = %self.match_id,
                    "dropping malformed raw event (missing id/eventId)"
                );
                continue;
            };

            if let Some(existing) = self.events.get(&incoming.feed_event_id) {
                let diff = existing.diff_against(&incoming);
                if !diff.is_empty() {
                    let event = DomainEvent::event_edited(
                        self.match_id.clone(),
                        incoming.feed_event_id,
                        diff.changed_fields,
                        diff.old_fields,
                    );
                    self.record(event);
                }
            } else {
                let event =
                    DomainEvent::global_event_added(self.match_id.clone(), incoming.clone());
                self.record(event);
            }

            if incoming.is_match_end() && !self.finished {
                self.finished = true;
                tracing::info!(match_id = %self.match_id, "match end observed");
            }
        }
    }

    /// 1. ドメインイベントを状態へ適用する
    /// 2. 未コミット一覧に積む
    fn record(&mut self, event: DomainEvent) {
        self.apply(&event);
        self.uncommitted.push(event);
    }
}
