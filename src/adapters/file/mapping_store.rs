use std::collections::HashMap;
use std::path::PathBuf;

use crate::ports::mapping_store::{MappingNamespace, MappingStore as MappingStoreTrait, Result};
use async_trait::async_trait;

/// File-backed implementation of MappingStore
///
/// One JSON file per namespace under a base directory
/// (e.g. `mappings/player.json`). Callers serialize writes per
/// namespace, so no interior locking is needed here.
pub struct FileMappingStore {
    base_dir: PathBuf,
}

impl FileMappingStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, namespace: MappingNamespace) -> PathBuf {
        self.base_dir.join(format!("{}.json", namespace.as_str()))
    }
}

#[async_trait]
impl MappingStoreTrait for FileMappingStore {
    /// Load a namespace; a missing file is an empty mapping
    async fn load(&self, namespace: MappingNamespace) -> Result<HashMap<String, String>> {
        match tokio::fs::read(self.path_for(namespace)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Persist a namespace as a single write
    async fn save(
        &self,
        namespace: MappingNamespace,
        mappings: &HashMap<String, String>,
    ) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_dir).await?;
        let bytes = serde_json::to_vec_pretty(mappings)?;
        tokio::fs::write(self.path_for(namespace), bytes).await?;
        Ok(())
    }
}
