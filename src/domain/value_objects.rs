#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 試合終了イベントのtype_id
pub const END_EVENT_TYPE: i32 = 30;

/// 後半のperiod_id
pub const SECOND_HALF_PERIOD: i32 = 2;

/// 試合ID - フィード提供元が発行する不透明な文字列
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// クオリファイア - フィードイベントに付随する属性
///
/// `(qualifier_id, value)` のペアとして扱い、順序に意味はない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub qualifier_id: i32,
    pub value: Option<String>,
}

impl Qualifier {
    pub fn new(qualifier_id: i32, value: Option<String>) -> Self {
        Self {
            qualifier_id,
            value,
        }
    }
}

/// クオリファイア列の多重集合としての等価判定
///
/// フィードはクオリファイアの順序を保証しないため、
/// 並び替えだけの差分を編集として扱ってはならない。
/// 長さが等しく、`qualifier_id → value` の対応が一致すれば等しい。
pub fn qualifiers_equal(old: &[Qualifier], new: &[Qualifier]) -> bool {
    if old.len() != new.len() {
        return false;
    }

    let old_map: BTreeMap<i32, &Option<String>> =
        old.iter().map(|q| (q.qualifier_id, &q.value)).collect();
    let new_map: BTreeMap<i32, &Option<String>> =
        new.iter().map(|q| (q.qualifier_id, &q.value)).collect();

    old_map == new_map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_id_roundtrip() {
        let id = MatchId::new("cbggpny9iygsfce7xf6wycb9w");
        assert_eq!(id.value(), "cbggpny9iygsfce7xf6wycb9w");
        assert_eq!(id.to_string(), "cbggpny9iygsfce7xf6wycb9w");
    }

    // TDD: qualifiers_equal のテスト
    #[test]
    fn test_qualifiers_equal_same_order() {
        let a = vec![
            Qualifier::new(140, Some("p3".into())),
            Qualifier::new(55, None),
        ];
        let b = a.clone();
        assert!(qualifiers_equal(&a, &b));
    }

    #[test]
    fn test_qualifiers_equal_reordered() {
        let a = vec![
            Qualifier::new(140, Some("p3".into())),
            Qualifier::new(55, None),
        ];
        let b = vec![
            Qualifier::new(55, None),
            Qualifier::new(140, Some("p3".into())),
        ];
        // 並び替えは編集とみなさない
        assert!(qualifiers_equal(&a, &b));
    }

    #[test]
    fn test_qualifiers_not_equal_on_value_change() {
        let a = vec![Qualifier::new(140, Some("p3".into()))];
        let b = vec![Qualifier::new(140, Some("p4".into()))];
        assert!(!qualifiers_equal(&a, &b));
    }

    #[test]
    fn test_qualifiers_not_equal_on_length_change() {
        let a = vec![Qualifier::new(140, Some("p3".into()))];
        let b = vec![
            Qualifier::new(140, Some("p3".into())),
            Qualifier::new(55, None),
        ];
        assert!(!qualifiers_equal(&a, &b));
    }

    #[test]
    fn test_qualifiers_equal_empty() {
        assert!(qualifiers_equal(&[], &[]));
    }
}
