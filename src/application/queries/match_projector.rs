use std::collections::{BTreeMap, HashMap};

use crate::domain::events::{DomainEvent, DomainEventBody};
use crate::domain::match_event::{FieldError, MatchEvent};
use crate::domain::value_objects::MatchId;
use crate::ports::projection_store::ProjectionRow;

/// 試合1件分の読み取りモデル状態
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    /// feed_event_id → 現在値
    pub events_by_id: BTreeMap<i64, MatchEvent>,
}

/// ドメインイベントを読み取りモデルへ投影する
///
/// イベントソーシングの原則：
/// 1. イベントが真実の情報源
/// 2. 読み取りモデルはイベントから導出される
/// 3. 同じイベント接頭辞を再生すれば同じ状態になる（純粋なfold）
#[derive(Debug, Default)]
pub struct MatchProjection {
    states: HashMap<MatchId, MatchState>,
}

impl MatchProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 永続化されたイベント列から読み取りモデルを再構築する
    #[allow(dead_code)]
    pub fn rebuild_from(events: &[DomainEvent]) -> Self {
        let mut projection = Self::new();
        for event in events {
            projection.project(event);
        }
        projection
    }

    /// ドメインイベント1件を読み取りモデルへ適用する
    ///
    /// 適用規則：
    /// - `GlobalEventAdded`：feed_event_idをキーに新しいレコードを挿入
    /// - `EventEdited`：該当レコードの変更フィールドだけを上書き。
    ///   未知のフィールドは警告して無視する（前方互換）。
    pub fn project(&mut self, event: &DomainEvent) {
        let state = self.states.entry(event.aggregate_id.clone()).or_default();

        match &event.body {
            DomainEventBody::GlobalEventAdded(added) => {
                state.events_by_id.insert(added.feed_event_id, added.clone());
            }
            DomainEventBody::EventEdited(edited) => {
                let Some(entry) = state.events_by_id.get_mut(&edited.feed_event_id) else {
                    tracing::warn!(
                        match_id = %event.aggregate_id,
                        feed_event_id = edited.feed_event_id,
                        "edit for unknown feed event ignored by projector"
                    );
                    return;
                };

                for (field, value) in &edited.changed_fields {
                    match entry.set_field(field, value) {
                        Ok(()) => {}
                        Err(FieldError::Unknown(name)) => {
                            tracing::warn!(
                                match_id = %event.aggregate_id,
                                feed_event_id = edited.feed_event_id,
                                field = %name,
                                "unknown field in edit ignored by projector"
                            );
                        }
                        Err(FieldError::InvalidValue { field, value }) => {
                            tracing::warn!(
                                match_id = %event.aggregate_id,
                                feed_event_id = edited.feed_event_id,
                                field = %field,
                                %value,
                                "invalid value in edit ignored by projector"
                            );
                        }
                    }
                }
            }
        }
    }

    /// 試合の現在状態を取得する
    #[allow(dead_code)]
    pub fn state(&self, match_id: &MatchId) -> Option<&MatchState> {
        self.states.get(match_id)
    }

    /// 試合の現在状態を投影行の一覧として取得する
    ///
    /// `event_id` 昇順で返す。状態が無ければ空。
    pub fn current_rows(&self, match_id: &MatchId) -> Vec<ProjectionRow> {
        self.states
            .get(match_id)
            .map(|state| {
                state
                    .events_by_id
                    .values()
                    .map(|event| ProjectionRow::from_event(match_id.clone(), event))
                    .collect()
            })
            .unwrap_or_default()
    }
}
