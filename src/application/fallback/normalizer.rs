use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_objects::{MatchId, Qualifier};
use crate::ports::mapping_store::MappingNamespace;
use crate::ports::player_store::{PlayerRecord, PlayerStore};
use crate::ports::projection_store::{ProjectionRow, ProjectionStore};
use crate::ports::publisher::{MessageType, Publisher};

use super::errors::{FallbackError, Result};
use super::mappings::IdMappings;

// ============================================================================
// スクレイプされたペイロードの形式
// ============================================================================

/// 代替提供元のページソースに埋め込まれたペイロード
///
/// 必須トップレベルフィールドを欠くペイロードは解析段階で失敗する。
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackPayload {
    /// 外部選手ID（文字列キー）→ 表示名
    #[serde(rename = "playerIdNameDictionary")]
    pub player_names: HashMap<String, String>,
    pub events: Vec<ScrapedEvent>,
    pub home: ScrapedTeam,
    pub away: ScrapedTeam,
}

/// `{value, displayName}` 形式のラッパー
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypedValue {
    #[serde(default)]
    pub value: Option<i32>,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

/// スクレイプされたイベント1件
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrapedEvent {
    /// グローバルイベントID。浮動小数として来ることがある。
    pub id: Option<f64>,
    pub event_id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<TypedValue>,
    pub period: Option<TypedValue>,
    pub outcome_type: Option<TypedValue>,
    pub minute: Option<i32>,
    pub second: Option<i32>,
    pub team_id: Option<i64>,
    pub player_id: Option<i64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub qualifiers: Vec<ScrapedQualifier>,
}

/// スクレイプされたクオリファイア（`{type: {value}, value}` 形式）
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapedQualifier {
    #[serde(rename = "type")]
    pub kind: TypedValue,
    #[serde(default)]
    pub value: Option<Value>,
}

/// スクレイプされたチーム情報
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrapedTeam {
    pub team_id: Option<i64>,
    pub formations: Vec<ScrapedFormation>,
}

/// フォーメーション1件。先頭が初期ラインナップ。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrapedFormation {
    pub formation_id: Option<i64>,
    pub formation_name: Option<String>,
    pub formation_slots: Vec<i32>,
    pub player_ids: Vec<i64>,
    pub jersey_numbers: Vec<i32>,
    pub formation_positions: Vec<FormationPosition>,
    pub captain_player_id: Option<i64>,
}

/// ピッチ上の配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationPosition {
    pub vertical: f64,
    pub horizontal: f64,
}

/// 正規化済みラインナップ（内部ID）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lineup {
    pub team_id: String,
    pub formation_id: Option<i64>,
    pub formation_name: Option<String>,
    pub formation_slots: Vec<i32>,
    /// スロット0（ベンチ外）を除いた選手の内部ID
    pub player_ids: Vec<String>,
    pub formation_positions: Vec<FormationPosition>,
    pub captain_id: Option<String>,
}

/// フォールバックサービスの依存関係
#[derive(Clone)]
pub struct FallbackDependencies {
    pub projection_store: Arc<dyn ProjectionStore>,
    pub player_store: Arc<dyn PlayerStore>,
    pub publisher: Arc<dyn Publisher>,
    pub mappings: Arc<IdMappings>,
}

/// フォールバック実行1回の結果
#[derive(Debug)]
pub struct FallbackOutcome {
    pub match_id: MatchId,
    pub rows: Vec<ProjectionRow>,
    pub home_lineup: Lineup,
    pub away_lineup: Lineup,
    /// 自己修復で新規採番された選手数
    pub healed_players: usize,
    /// マッピング欠落等でスキップされたイベント数
    pub skipped_events: usize,
}

// ============================================================================
// ペイロードの修復と解析
// ============================================================================

/// 生のページソースを修復して解析する
///
/// スクレイピング由来のよくある欠損に耐える：
/// - 末尾の閉じ括弧 `}` の欠落
/// - 最後の括弧の前の余分なカンマ
///
/// 解析失敗と必須フィールドの欠落はこの実行全体の致命的エラー。
pub fn repair_page_source(raw: &str) -> Result<FallbackPayload> {
    let mut content = raw.trim_end().to_string();

    if content.ends_with(',') {
        content.pop();
    }

    let opens = content.matches('{').count();
    let closes = content.matches('}').count();
    if opens > closes {
        content.push('}');
    }

    serde_json::from_str(&content).map_err(|e| FallbackError::MalformedPayload(e.to_string()))
}

// ============================================================================
// 変換
// ============================================================================

/// スクレイプ形式のクオリファイアをフィード形式へ変換する
///
/// `{type: {value}, value}` → `{qualifier_id, value}`。
/// type.value を欠くクオリファイアは警告して捨てる。
pub fn transform_qualifiers(qualifiers: &[ScrapedQualifier]) -> Vec<Qualifier> {
    qualifiers
        .iter()
        .filter_map(|q| {
            let Some(qualifier_id) = q.kind.value else {
                tracing::warn!("scraped qualifier without type value dropped");
                return None;
            };
            let value = match &q.value {
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
                None => Some(String::new()),
            };
            Some(Qualifier::new(qualifier_id, value))
        })
        .collect()
}

/// スクレイプイベント1件を投影行へ変換する
///
/// 外部IDを内部IDへ写像する。team のマッピング欠落はこの
/// イベントの致命的エラー、player の欠落は回復可能（スキップして
/// 自己修復に委ねる）。
async fn to_projection_row(
    event: &ScrapedEvent,
    match_id: &MatchId,
    mappings: &IdMappings,
    stamp: &str,
) -> Result<ProjectionRow> {
    let event_id = event.id.ok_or(FallbackError::MissingEventId)? as i64;

    let contestant_id = match event.team_id {
        Some(external) => Some(
            mappings
                .lookup(MappingNamespace::Team, &external.to_string())
                .await
                .ok_or(FallbackError::MappingMissing {
                    namespace: MappingNamespace::Team.as_str(),
                    external_id: external.to_string(),
                })?,
        ),
        None => None,
    };

    let player_id = match event.player_id {
        Some(external) => Some(
            mappings
                .lookup(MappingNamespace::Player, &external.to_string())
                .await
                .ok_or(FallbackError::PlayerUnmapped {
                    external_id: external.to_string(),
                })?,
        ),
        None => None,
    };

    Ok(ProjectionRow {
        match_id: match_id.clone(),
        event_id,
        local_event_id: event.event_id,
        type_id: event.kind.as_ref().and_then(|t| t.value),
        period_id: event.period.as_ref().and_then(|t| t.value),
        time_min: event.minute,
        time_sec: event.second,
        contestant_id,
        player_id,
        player_name: None,
        outcome: event.outcome_type.as_ref().and_then(|t| t.value),
        x: event.x,
        y: event.y,
        qualifiers: transform_qualifiers(&event.qualifiers),
        time_stamp: Some(stamp.to_string()),
        last_modified: Some(stamp.to_string()),
    })
}

// ============================================================================
// 選手の自己修復
// ============================================================================

/// 両チームの初期フォーメーションから選手ロスターを自己修復する
///
/// `playerIds` と `jerseyNumbers` を突き合わせ、名前辞書を参照して
/// 未知の外部選手IDに内部IDを採番し、選手レコードをupsertする。
/// マッピングの伸長はその場で永続化される。戻り値は新規採番数。
pub async fn heal_players(
    payload: &FallbackPayload,
    mappings: &IdMappings,
    player_store: &Arc<dyn PlayerStore>,
) -> Result<usize> {
    let mut healed = 0;

    for team in [&payload.home, &payload.away] {
        let Some(external_team_id) = team.team_id else {
            return Err(FallbackError::MalformedPayload(
                "team without teamId".to_string(),
            ));
        };
        let internal_team_id = mappings
            .lookup(MappingNamespace::Team, &external_team_id.to_string())
            .await
            .ok_or(FallbackError::MappingMissing {
                namespace: MappingNamespace::Team.as_str(),
                external_id: external_team_id.to_string(),
            })?;

        let Some(formation) = team.formations.first() else {
            return Err(FallbackError::MissingFormation {
                team_id: external_team_id.to_string(),
            });
        };

        for (external_player_id, shirt_number) in formation
            .player_ids
            .iter()
            .zip(formation.jersey_numbers.iter())
        {
            let external = external_player_id.to_string();
            let Some(player_name) = payload.player_names.get(&external) else {
                tracing::warn!(
                    player_id = %external,
                    "roster player missing from name dictionary, skipping"
                );
                continue;
            };

            let known = mappings
                .lookup(MappingNamespace::Player, &external)
                .await
                .is_some();
            let internal = mappings
                .get_or_create(MappingNamespace::Player, &external)
                .await?;
            if !known {
                healed += 1;
            }

            let (first_name, last_name) = split_name(player_name);
            player_store
                .upsert_player(PlayerRecord {
                    player_id: internal,
                    team_id: internal_team_id.clone(),
                    first_name,
                    last_name,
                    match_name: player_name.clone(),
                    shirt_number: Some(*shirt_number),
                })
                .await
                .map_err(FallbackError::PlayerStore)?;
        }
    }

    Ok(healed)
}

/// 表示名を姓名に分割する（最初の空白で分ける）
fn split_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (name.to_string(), String::new()),
    }
}

// ============================================================================
// ラインナップ抽出
// ============================================================================

/// チームの初期フォーメーションからラインナップを抽出する
///
/// スロットが0（ベンチ外）の選手は `player_ids` から除かれる。
/// 自己修復済みであれば全選手が内部IDへ解決される。未解決の
/// 選手は外部IDのまま残る（下流で突き合わせできるように）。
pub async fn extract_lineup(team: &ScrapedTeam, mappings: &IdMappings) -> Result<Lineup> {
    let Some(external_team_id) = team.team_id else {
        return Err(FallbackError::MalformedPayload(
            "team without teamId".to_string(),
        ));
    };
    let internal_team_id = mappings
        .lookup(MappingNamespace::Team, &external_team_id.to_string())
        .await
        .ok_or(FallbackError::MappingMissing {
            namespace: MappingNamespace::Team.as_str(),
            external_id: external_team_id.to_string(),
        })?;

    let Some(formation) = team.formations.first() else {
        return Err(FallbackError::MissingFormation {
            team_id: external_team_id.to_string(),
        });
    };

    let mut player_ids = Vec::new();
    for (player_id, slot) in formation
        .player_ids
        .iter()
        .zip(formation.formation_slots.iter())
    {
        if *slot == 0 {
            continue;
        }
        let external = player_id.to_string();
        let internal = mappings
            .lookup(MappingNamespace::Player, &external)
            .await
            .unwrap_or(external);
        player_ids.push(internal);
    }

    let captain_id = match formation.captain_player_id {
        Some(external) => {
            let captain = mappings
                .lookup(MappingNamespace::Player, &external.to_string())
                .await;
            if captain.is_none() {
                tracing::warn!(
                    player_id = external,
                    "captain not in player mapping"
                );
            }
            captain
        }
        None => None,
    };

    Ok(Lineup {
        team_id: internal_team_id,
        formation_id: formation.formation_id,
        formation_name: formation.formation_name.clone(),
        formation_slots: formation.formation_slots.clone(),
        player_ids,
        formation_positions: formation.formation_positions.clone(),
        captain_id,
    })
}

// ============================================================================
// オーケストレーション
// ============================================================================

/// フォールバック取り込みを1回実行する
///
/// 主系フィードが使えない試合に対して呼ばれる：
/// 1. ページソースを修復・解析
/// 2. ロスターの自己修復（先に走らせ、採番した内部IDを
///    イベント変換から参照できるようにする）
/// 3. イベントを投影行へ変換（マッピング欠落は該当イベントのみ
///    スキップ）
/// 4. ラインナップ抽出
/// 5. 1バッチでupsertし、`update` を配信
///
/// マッピングは永続的、upsertは `event_id` キーのため、同じ入力での
/// 再実行は同じマッピングと同一の行を生む（冪等）。
pub async fn run_fallback(
    deps: &FallbackDependencies,
    external_game_id: &str,
    page_source: &str,
) -> Result<FallbackOutcome> {
    let payload = repair_page_source(page_source)?;

    let match_id = deps
        .mappings
        .lookup(MappingNamespace::Match, external_game_id)
        .await
        .map(MatchId::new)
        .ok_or(FallbackError::MappingMissing {
            namespace: MappingNamespace::Match.as_str(),
            external_id: external_game_id.to_string(),
        })?;

    let healed_players = heal_players(&payload, &deps.mappings, &deps.player_store).await?;

    let stamp = Utc::now().to_rfc3339();
    let mut rows = Vec::with_capacity(payload.events.len());
    let mut skipped_events = 0;

    for event in &payload.events {
        match to_projection_row(event, &match_id, &deps.mappings, &stamp).await {
            Ok(row) => rows.push(row),
            Err(FallbackError::PlayerUnmapped { external_id }) => {
                tracing::warn!(
                    match_id = %match_id,
                    player_id = %external_id,
                    "undetected player, event skipped"
                );
                skipped_events += 1;
            }
            Err(FallbackError::MissingEventId) => {
                tracing::warn!(match_id = %match_id, "scraped event without id skipped");
                skipped_events += 1;
            }
            Err(FallbackError::MappingMissing {
                namespace,
                external_id,
            }) => {
                tracing::error!(
                    match_id = %match_id,
                    namespace,
                    external_id = %external_id,
                    "mandatory mapping missing, event skipped"
                );
                skipped_events += 1;
            }
            Err(other) => return Err(other),
        }
    }

    let home_lineup = extract_lineup(&payload.home, &deps.mappings).await?;
    let away_lineup = extract_lineup(&payload.away, &deps.mappings).await?;

    deps.projection_store
        .upsert_many(rows.clone())
        .await
        .map_err(FallbackError::ProjectionStore)?;
    deps.publisher
        .publish(&match_id, MessageType::Update, &rows)
        .await
        .map_err(FallbackError::Publish)?;

    tracing::info!(
        match_id = %match_id,
        rows = rows.len(),
        skipped = skipped_events,
        healed = healed_players,
        "fallback ingestion completed"
    );

    Ok(FallbackOutcome {
        match_id,
        rows,
        home_lineup,
        away_lineup,
        healed_players,
        skipped_events,
    })
}
