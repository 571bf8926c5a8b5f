#![allow(dead_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::value_objects::{END_EVENT_TYPE, Qualifier, SECOND_HALF_PERIOD, qualifiers_equal};

/// フィードイベントのフィールド操作エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// 未知のフィールド名（前方互換のため呼び出し側は警告して無視する）
    Unknown(String),
    /// フィールドの型に合わない値
    InvalidValue { field: String, value: Value },
}

/// 差分対象フィールドの一覧
///
/// 集約の差分検出と投影の編集適用はどちらもこの一覧を走査する。
/// フィールドを追加するときは `field_value` / `set_field` と
/// この一覧の三箇所を揃えること。
/// `feed_event_id` と `local_event_id` は不変の識別子であり含めない。
pub const DIFFABLE_FIELDS: &[&str] = &[
    "type_id",
    "period_id",
    "time_min",
    "time_sec",
    "contestant_id",
    "player_id",
    "player_name",
    "outcome",
    "x",
    "y",
    "qualifiers",
    "time_stamp",
    "last_modified",
];

/// フィードイベント1件の現在値
///
/// 読み取りモデルの1行に相当する。識別子2つを除く全フィールドは
/// nullable：フィードに無いフィールドは「未変更」ではなく null として扱う
/// （上流は毎回イベントの全形を送ってくる）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub feed_event_id: i64,
    pub local_event_id: i32,
    pub type_id: Option<i32>,
    pub period_id: Option<i32>,
    pub time_min: Option<i32>,
    pub time_sec: Option<i32>,
    pub contestant_id: Option<String>,
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub outcome: Option<i32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    pub time_stamp: Option<String>,
    pub last_modified: Option<String>,
}

/// フィールド単位の差分
///
/// 不変条件：`changed_fields` に現れるキーは必ず `old_fields` にも
/// 現れ、値は編集前のものを保持する。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDiff {
    pub changed_fields: BTreeMap<String, Value>,
    pub old_fields: BTreeMap<String, Value>,
}

impl FieldDiff {
    pub fn is_empty(&self) -> bool {
        self.changed_fields.is_empty()
    }
}

impl MatchEvent {
    /// フィード形式のイベントから構築する
    ///
    /// `id`（グローバルID）と `eventId`（ローカル連番）のどちらかを
    /// 欠くイベントは不正形とみなし `None` を返す。
    pub fn from_feed(raw: &FeedEvent) -> Option<Self> {
        let feed_event_id = raw.id?;
        let local_event_id = raw.event_id?;

        Some(Self {
            feed_event_id,
            local_event_id,
            type_id: raw.type_id,
            period_id: raw.period_id,
            time_min: raw.time_min,
            time_sec: raw.time_sec,
            contestant_id: raw.contestant_id.clone(),
            player_id: raw.player_id.clone(),
            player_name: raw.player_name.clone(),
            outcome: raw.outcome,
            x: raw.x,
            y: raw.y,
            qualifiers: raw
                .qualifiers
                .iter()
                .map(|q| Qualifier::new(q.qualifier_id, q.value.clone()))
                .collect(),
            time_stamp: raw.time_stamp.clone(),
            last_modified: raw.last_modified.clone(),
        })
    }

    /// 試合終了を示すイベントか
    pub fn is_match_end(&self) -> bool {
        self.type_id == Some(END_EVENT_TYPE) && self.period_id == Some(SECOND_HALF_PERIOD)
    }

    /// フィールド名からJSON表現の現在値を取得する
    ///
    /// 未知のフィールド名には `None` を返す。
    pub fn field_value(&self, field: &str) -> Option<Value> {
        let value = match field {
            "type_id" => json!(self.type_id),
            "period_id" => json!(self.period_id),
            "time_min" => json!(self.time_min),
            "time_sec" => json!(self.time_sec),
            "contestant_id" => json!(self.contestant_id),
            "player_id" => json!(self.player_id),
            "player_name" => json!(self.player_name),
            "outcome" => json!(self.outcome),
            "x" => json!(self.x),
            "y" => json!(self.y),
            "qualifiers" => json!(self.qualifiers),
            "time_stamp" => json!(self.time_stamp),
            "last_modified" => json!(self.last_modified),
            _ => return None,
        };
        Some(value)
    }

    /// フィールド名でJSON表現の値を書き込む
    pub fn set_field(&mut self, field: &str, value: &Value) -> Result<(), FieldError> {
        match field {
            "type_id" => self.type_id = as_int(field, value)?,
            "period_id" => self.period_id = as_int(field, value)?,
            "time_min" => self.time_min = as_int(field, value)?,
            "time_sec" => self.time_sec = as_int(field, value)?,
            "contestant_id" => self.contestant_id = as_text(field, value)?,
            "player_id" => self.player_id = as_text(field, value)?,
            "player_name" => self.player_name = as_text(field, value)?,
            "outcome" => self.outcome = as_int(field, value)?,
            "x" => self.x = as_float(field, value)?,
            "y" => self.y = as_float(field, value)?,
            "qualifiers" => {
                self.qualifiers = serde_json::from_value(value.clone()).map_err(|_| {
                    FieldError::InvalidValue {
                        field: field.to_string(),
                        value: value.clone(),
                    }
                })?;
            }
            "time_stamp" => self.time_stamp = as_text(field, value)?,
            "last_modified" => self.last_modified = as_text(field, value)?,
            _ => return Err(FieldError::Unknown(field.to_string())),
        }
        Ok(())
    }

    /// 新しいスナップショットとの差分を計算する
    ///
    /// 全差分対象フィールドを独立に比較する：
    /// - `qualifiers` は多重集合として比較（並び替えは差分にならない）
    /// - 浮動小数はIEEE等価（イプシロンなし。未変更のフィードは
    ///   ビット同一の値を返してくる）
    /// - その他のスカラーは正準表現の等価
    pub fn diff_against(&self, newer: &Self) -> FieldDiff {
        let mut diff = FieldDiff::default();

        for &field in DIFFABLE_FIELDS {
            let equal = if field == "qualifiers" {
                qualifiers_equal(&self.qualifiers, &newer.qualifiers)
            } else {
                self.field_value(field) == newer.field_value(field)
            };

            if !equal {
                if let (Some(new_value), Some(old_value)) =
                    (newer.field_value(field), self.field_value(field))
                {
                    diff.changed_fields.insert(field.to_string(), new_value);
                    diff.old_fields.insert(field.to_string(), old_value);
                }
            }
        }

        diff
    }
}

fn as_int(field: &str, value: &Value) -> Result<Option<i32>, FieldError> {
    match value {
        Value::Null => Ok(None),
        _ => value
            .as_i64()
            .map(|n| Some(n as i32))
            .ok_or_else(|| FieldError::InvalidValue {
                field: field.to_string(),
                value: value.clone(),
            }),
    }
}

fn as_float(field: &str, value: &Value) -> Result<Option<f64>, FieldError> {
    match value {
        Value::Null => Ok(None),
        _ => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| FieldError::InvalidValue {
                field: field.to_string(),
                value: value.clone(),
            }),
    }
}

fn as_text(field: &str, value: &Value) -> Result<Option<String>, FieldError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(FieldError::InvalidValue {
            field: field.to_string(),
            value: value.clone(),
        }),
    }
}

// ============================================================================
// フィードのワイヤ形式
// ============================================================================

/// 上流フィードのイベント形式（camelCase）
///
/// `id` と `eventId` 以外はすべて省略されうる。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedEvent {
    pub id: Option<i64>,
    pub event_id: Option<i32>,
    pub type_id: Option<i32>,
    pub period_id: Option<i32>,
    pub time_min: Option<i32>,
    pub time_sec: Option<i32>,
    pub contestant_id: Option<String>,
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub outcome: Option<i32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[serde(rename = "qualifier")]
    pub qualifiers: Vec<FeedQualifier>,
    pub time_stamp: Option<String>,
    pub last_modified: Option<String>,
}

/// フィードのクオリファイア形式
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQualifier {
    pub qualifier_id: i32,
    #[serde(default)]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_event() -> MatchEvent {
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
            qualifiers: vec![Qualifier::new(140, Some("p3".into()))],
            time_stamp: None,
            last_modified: None,
        }
    }

    #[test]
    fn test_from_feed_builds_full_event() {
        let raw: FeedEvent = serde_json::from_value(json!({
            "id": 1001,
            "eventId": 1,
            "typeId": 34,
            "periodId": 1,
            "timeMin": 0,
            "timeSec": 0,
            "contestantId": "H",
            "playerId": "p1",
            "outcome": 1,
            "x": 50.0,
            "y": 50.0,
            "qualifier": [{"qualifierId": 140, "value": "p3"}]
        }))
        .unwrap();

        let event = MatchEvent::from_feed(&raw).unwrap();
        assert_eq!(event.feed_event_id, 1001);
        assert_eq!(event.local_event_id, 1);
        assert_eq!(event.type_id, Some(34));
        assert_eq!(event.qualifiers, vec![Qualifier::new(140, Some("p3".into()))]);
        // 送られてこなかったフィールドは null
        assert_eq!(event.player_name, None);
    }

    #[test]
    fn test_from_feed_rejects_missing_identifiers() {
        let missing_id: FeedEvent =
            serde_json::from_value(json!({"eventId": 1, "typeId": 34})).unwrap();
        assert!(MatchEvent::from_feed(&missing_id).is_none());

        let missing_local: FeedEvent =
            serde_json::from_value(json!({"id": 1001, "typeId": 34})).unwrap();
        assert!(MatchEvent::from_feed(&missing_local).is_none());
    }

    // TDD: diff_against のテスト
    #[test]
    fn test_diff_detects_type_change_with_old_value() {
        let old = base_event();
        let mut new = base_event();
        new.type_id = Some(3);

        let diff = old.diff_against(&new);
        assert_eq!(diff.changed_fields.len(), 1);
        assert_eq!(diff.changed_fields["type_id"], json!(3));
        assert_eq!(diff.old_fields["type_id"], json!(34));
    }

    #[test]
    fn test_diff_is_empty_for_identical_events() {
        let old = base_event();
        let new = base_event();
        assert!(old.diff_against(&new).is_empty());
    }

    #[test]
    fn test_diff_ignores_qualifier_reorder() {
        let mut old = base_event();
        old.qualifiers = vec![
            Qualifier::new(140, Some("p3".into())),
            Qualifier::new(55, None),
        ];
        let mut new = base_event();
        new.qualifiers = vec![
            Qualifier::new(55, None),
            Qualifier::new(140, Some("p3".into())),
        ];
        assert!(old.diff_against(&new).is_empty());
    }

    #[test]
    fn test_diff_detects_qualifier_value_change() {
        let old = base_event();
        let mut new = base_event();
        new.qualifiers = vec![Qualifier::new(140, Some("p4".into()))];

        let diff = old.diff_against(&new);
        assert!(diff.changed_fields.contains_key("qualifiers"));
        assert!(diff.old_fields.contains_key("qualifiers"));
    }

    #[test]
    fn test_diff_treats_absent_field_as_null_not_unchanged() {
        let old = base_event();
        let mut new = base_event();
        new.x = None;

        let diff = old.diff_against(&new);
        assert_eq!(diff.changed_fields["x"], Value::Null);
        assert_eq!(diff.old_fields["x"], json!(50.0));
    }

    #[test]
    fn test_diff_float_ieee_equality() {
        let old = base_event();
        let mut new = base_event();
        new.x = Some(50.0);
        assert!(old.diff_against(&new).is_empty());

        new.x = Some(50.000001);
        assert!(!old.diff_against(&new).is_empty());
    }

    // TDD: set_field のテスト
    #[test]
    fn test_set_field_applies_scalar_and_qualifiers() {
        let mut event = base_event();
        event.set_field("type_id", &json!(3)).unwrap();
        assert_eq!(event.type_id, Some(3));

        event.set_field("x", &Value::Null).unwrap();
        assert_eq!(event.x, None);

        event
            .set_field("qualifiers", &json!([{"qualifier_id": 7, "value": null}]))
            .unwrap();
        assert_eq!(event.qualifiers, vec![Qualifier::new(7, None)]);
    }

    #[test]
    fn test_set_field_unknown_field() {
        let mut event = base_event();
        let err = event.set_field("not_a_field", &json!(1)).unwrap_err();
        assert_eq!(err, FieldError::Unknown("not_a_field".to_string()));
    }

    #[test]
    fn test_set_field_invalid_value() {
        let mut event = base_event();
        assert!(matches!(
            event.set_field("type_id", &json!("three")),
            Err(FieldError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_diff_roundtrips_through_set_field() {
        let old = base_event();
        let mut new = base_event();
        new.type_id = Some(3);
        new.outcome = None;
        new.qualifiers = vec![Qualifier::new(141, Some("p9".into()))];

        let diff = old.diff_against(&new);
        let mut replayed = old.clone();
        for (field, value) in &diff.changed_fields {
            replayed.set_field(field, value).unwrap();
        }
        assert_eq!(replayed, new);
    }

    #[test]
    fn test_is_match_end() {
        let mut event = base_event();
        assert!(!event.is_match_end());

        event.type_id = Some(30);
        event.period_id = Some(2);
        assert!(event.is_match_end());

        // 前半の END は試合終了ではない
        event.period_id = Some(1);
        assert!(!event.is_match_end());
    }
}
