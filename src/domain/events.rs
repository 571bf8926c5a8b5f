#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::match_event::MatchEvent;
use super::value_objects::MatchId;

/// イベント：既存のフィードイベントが編集された
///
/// 不変条件：`changed_fields` の各キーは `old_fields` にも現れ、
/// 編集前の値を保持する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEdited {
    pub feed_event_id: i64,
    pub changed_fields: BTreeMap<String, Value>,
    pub old_fields: BTreeMap<String, Value>,
}

/// ドメインイベントの本体
///
/// `GlobalEventAdded` は挿入時点の全フィールドをそのまま運ぶ。
/// `EventEdited` は変更されたフィールドと旧値のみを運ぶ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEventBody {
    GlobalEventAdded(MatchEvent),
    EventEdited(EventEdited),
}

/// ドメインイベント - 集約が発行する不変の事実
///
/// `occurred_on` はフィード上の発生時刻ではなく、
/// このドメインイベントが生成されたシステム時刻。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub domain_event_id: Uuid,
    pub aggregate_id: MatchId,
    pub occurred_on: DateTime<Utc>,
    pub body: DomainEventBody,
}

/// 永続化時のデシリアライズエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDecodeError {
    /// 未知のイベント種別タグ
    UnknownEventType(String),
    /// ペイロードが種別の形に合わない
    MalformedPayload(String),
}

impl std::fmt::Display for EventDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEventType(tag) => write!(f, "unknown event type: {}", tag),
            Self::MalformedPayload(msg) => write!(f, "malformed event payload: {}", msg),
        }
    }
}

impl std::error::Error for EventDecodeError {}

impl DomainEvent {
    /// 新規フィードイベントの発見を記録する
    ///
    /// `occurred_on` はストアのタイムスタンプ精度（マイクロ秒）に
    /// 切り詰める。永続化を往復しても同値であること。
    pub fn global_event_added(aggregate_id: MatchId, event: MatchEvent) -> Self {
        Self {
            domain_event_id: Uuid::new_v4(),
            aggregate_id,
            occurred_on: Utc::now().trunc_subsecs(6),
            body: DomainEventBody::GlobalEventAdded(event),
        }
    }

    /// 既存フィードイベントの編集を記録する
    pub fn event_edited(
        aggregate_id: MatchId,
        feed_event_id: i64,
        changed_fields: BTreeMap<String, Value>,
        old_fields: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            domain_event_id: Uuid::new_v4(),
            aggregate_id,
            occurred_on: Utc::now().trunc_subsecs(6),
            body: DomainEventBody::EventEdited(EventEdited {
                feed_event_id,
                changed_fields,
                old_fields,
            }),
        }
    }

    /// 永続化用のイベント種別タグ
    pub fn event_type(&self) -> &'static str {
        match &self.body {
            DomainEventBody::GlobalEventAdded(_) => "GlobalEventAdded",
            DomainEventBody::EventEdited(_) => "EventEdited",
        }
    }

    /// 対象フィードイベントのID
    pub fn feed_event_id(&self) -> i64 {
        match &self.body {
            DomainEventBody::GlobalEventAdded(event) => event.feed_event_id,
            DomainEventBody::EventEdited(edited) => edited.feed_event_id,
        }
    }

    /// 永続化ペイロードへの変換
    ///
    /// メタデータ（ID・集約ID・発生時刻・種別）はストア側のカラムに
    /// 載るため、ペイロードには種別固有のフィールドだけを入れる。
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match &self.body {
            DomainEventBody::GlobalEventAdded(event) => serde_json::to_value(event),
            DomainEventBody::EventEdited(edited) => serde_json::to_value(edited),
        }
    }

    /// 永続化された行からの復元
    pub fn from_payload(
        event_type: &str,
        domain_event_id: Uuid,
        aggregate_id: MatchId,
        occurred_on: DateTime<Utc>,
        payload: Value,
    ) -> Result<Self, EventDecodeError> {
        let body = match event_type {
            "GlobalEventAdded" => DomainEventBody::GlobalEventAdded(
                serde_json::from_value(payload)
                    .map_err(|e| EventDecodeError::MalformedPayload(e.to_string()))?,
            ),
            "EventEdited" => DomainEventBody::EventEdited(
                serde_json::from_value(payload)
                    .map_err(|e| EventDecodeError::MalformedPayload(e.to_string()))?,
            ),
            other => return Err(EventDecodeError::UnknownEventType(other.to_string())),
        };

        Ok(Self {
            domain_event_id,
            aggregate_id,
            occurred_on,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> MatchEvent {
        MatchEvent {
            feed_event_id: 1001,
            local_event_id: 1,
            type_id: Some(34),
            period_id: Some(1),
            time_min: Some(0),
            time_sec: Some(0),
            contestant_id: Some("H".into()),
            player_id: Some("p1".into()),
            player_name: None,
            outcome: Some(1),
            x: Some(50.0),
            y: Some(50.0),
            qualifiers: vec![],
            time_stamp: None,
            last_modified: None,
        }
    }

    #[test]
    fn test_payload_roundtrip_global_event_added() {
        let event = DomainEvent::global_event_added(MatchId::new("m1"), sample_event());

        let payload = event.payload().unwrap();
        let restored = DomainEvent::from_payload(
            event.event_type(),
            event.domain_event_id,
            event.aggregate_id.clone(),
            event.occurred_on,
            payload,
        )
        .unwrap();

        assert_eq!(restored, event);
    }

    #[test]
    fn test_payload_roundtrip_event_edited() {
        let mut changed = BTreeMap::new();
        changed.insert("type_id".to_string(), json!(3));
        let mut old = BTreeMap::new();
        old.insert("type_id".to_string(), json!(34));

        let event = DomainEvent::event_edited(MatchId::new("m1"), 1001, changed, old);

        let payload = event.payload().unwrap();
        let restored = DomainEvent::from_payload(
            event.event_type(),
            event.domain_event_id,
            event.aggregate_id.clone(),
            event.occurred_on,
            payload,
        )
        .unwrap();

        assert_eq!(restored, event);
        assert_eq!(restored.feed_event_id(), 1001);
    }

    #[test]
    fn test_from_payload_rejects_unknown_event_type() {
        let result = DomainEvent::from_payload(
            "SomethingElse",
            Uuid::new_v4(),
            MatchId::new("m1"),
            Utc::now(),
            json!({}),
        );
        assert!(matches!(
            result,
            Err(EventDecodeError::UnknownEventType(_))
        ));
    }
}
