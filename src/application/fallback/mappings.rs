use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::ports::mapping_store::{MappingNamespace, MappingStore};

use super::errors::{FallbackError, Result};

/// 外部IDから内部IDへのマッピング（プロセス全体で共有）
///
/// 名前空間ごとに部分関数 `external_id → internal_id` を保持する。
/// 新しい外部IDが現れたら不透明な内部IDを採番してマッピングを
/// 伸長し、その場で永続化する。
///
/// # 共有状態の規則
///
/// - 読み取りはreadロックのスナップショット
/// - 採番と永続化はwriteロック下で直列化される（名前空間単位）。
///   ロックを保持したまま保存するため、並行する呼び出しが
///   同じ外部IDに別の内部IDを発行することはない。
pub struct IdMappings {
    store: Arc<dyn MappingStore>,
    match_ids: RwLock<HashMap<String, String>>,
    team_ids: RwLock<HashMap<String, String>>,
    player_ids: RwLock<HashMap<String, String>>,
    tournament_ids: RwLock<HashMap<String, String>>,
}

impl IdMappings {
    /// 永続化済みのマッピングを全名前空間分読み込んで構築する
    pub async fn load(store: Arc<dyn MappingStore>) -> Result<Self> {
        let match_ids = store
            .load(MappingNamespace::Match)
            .await
            .map_err(FallbackError::MappingStore)?;
        let team_ids = store
            .load(MappingNamespace::Team)
            .await
            .map_err(FallbackError::MappingStore)?;
        let player_ids = store
            .load(MappingNamespace::Player)
            .await
            .map_err(FallbackError::MappingStore)?;
        let tournament_ids = store
            .load(MappingNamespace::Tournament)
            .await
            .map_err(FallbackError::MappingStore)?;

        Ok(Self {
            store,
            match_ids: RwLock::new(match_ids),
            team_ids: RwLock::new(team_ids),
            player_ids: RwLock::new(player_ids),
            tournament_ids: RwLock::new(tournament_ids),
        })
    }

    fn namespace(&self, namespace: MappingNamespace) -> &RwLock<HashMap<String, String>> {
        match namespace {
            MappingNamespace::Match => &self.match_ids,
            MappingNamespace::Team => &self.team_ids,
            MappingNamespace::Player => &self.player_ids,
            MappingNamespace::Tournament => &self.tournament_ids,
        }
    }

    /// 外部IDに対応する内部IDを探す
    pub async fn lookup(&self, namespace: MappingNamespace, external_id: &str) -> Option<String> {
        self.namespace(namespace).read().await.get(external_id).cloned()
    }

    /// 既存の内部IDを返すか、新しく採番して永続化する
    ///
    /// 採番はwriteロック下で行われ、同じ名前空間への並行呼び出しは
    /// 直列化される。同じ入力で再実行しても同じマッピングになる。
    pub async fn get_or_create(
        &self,
        namespace: MappingNamespace,
        external_id: &str,
    ) -> Result<String> {
        {
            let map = self.namespace(namespace).read().await;
            if let Some(internal) = map.get(external_id) {
                return Ok(internal.clone());
            }
        }

        let mut map = self.namespace(namespace).write().await;
        // writeロック獲得までの間に他の呼び出しが採番したかもしれない
        if let Some(internal) = map.get(external_id) {
            return Ok(internal.clone());
        }

        let internal = Uuid::new_v4().simple().to_string();
        map.insert(external_id.to_string(), internal.clone());
        self.store
            .save(namespace, &map)
            .await
            .map_err(FallbackError::MappingStore)?;

        tracing::info!(
            namespace = namespace.as_str(),
            external_id,
            internal_id = %internal,
            "minted new id mapping"
        );
        Ok(internal)
    }

    /// マッピングを明示的に登録して永続化する
    ///
    /// 参照データ投入やテストのシード用。
    #[allow(dead_code)]
    pub async fn insert(
        &self,
        namespace: MappingNamespace,
        external_id: &str,
        internal_id: &str,
    ) -> Result<()> {
        let mut map = self.namespace(namespace).write().await;
        map.insert(external_id.to_string(), internal_id.to_string());
        self.store
            .save(namespace, &map)
            .await
            .map_err(FallbackError::MappingStore)
    }
}
