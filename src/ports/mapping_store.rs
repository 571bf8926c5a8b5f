use std::collections::HashMap;

use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// IDマッピングの名前空間
///
/// フォールバック提供元の外部IDから内部IDへの部分関数が
/// 名前空間ごとに1つ存在する。
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingNamespace {
    Match,
    Team,
    Player,
    Tournament,
}

impl MappingNamespace {
    /// 永続化ファイル名などに使う文字列表現
    #[allow(dead_code)]
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingNamespace::Match => "match",
            MappingNamespace::Team => "team",
            MappingNamespace::Player => "player",
            MappingNamespace::Tournament => "tournament",
        }
    }
}

/// IDマッピング永続化ポート
///
/// 名前空間単位の全量読み書き。書き込みは単一のwriteで行われ、
/// 並行する呼び出し側はマッピング所有者側のロックで直列化される。
#[allow(dead_code)]
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// 名前空間のマッピング全体を読み込む
    async fn load(&self, namespace: MappingNamespace) -> Result<HashMap<String, String>>;

    /// 名前空間のマッピング全体を保存する
    async fn save(
        &self,
        namespace: MappingNamespace,
        mappings: &HashMap<String, String>,
    ) -> Result<()>;
}
