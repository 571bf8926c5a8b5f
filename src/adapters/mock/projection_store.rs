use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use crate::domain::value_objects::MatchId;
use crate::ports::projection_store::{
    ProjectionRow, ProjectionStore as ProjectionStoreTrait, Result,
};
use async_trait::async_trait;

/// Mock implementation of ProjectionStore
///
/// In-memory upsert map keyed by event_id, with the same in-batch
/// first-wins semantics as the PostgreSQL implementation.
#[allow(dead_code)]
#[derive(Default)]
pub struct ProjectionStore {
    rows: Mutex<BTreeMap<i64, ProjectionRow>>,
}

#[allow(dead_code)]
impl ProjectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored
    pub fn len(&self) -> usize {
        self.rows.lock().expect("projection store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProjectionStoreTrait for ProjectionStore {
    async fn upsert_many(&self, rows: Vec<ProjectionRow>) -> Result<()> {
        let mut seen = HashSet::new();
        let mut store = self.rows.lock().expect("projection store mutex poisoned");

        for row in rows {
            if !seen.insert(row.event_id) {
                tracing::warn!(event_id = row.event_id, "duplicate event in upsert batch");
                continue;
            }
            store.insert(row.event_id, row);
        }
        Ok(())
    }

    async fn load_by_match(&self, match_id: &MatchId) -> Result<Vec<ProjectionRow>> {
        Ok(self
            .rows
            .lock()
            .expect("projection store mutex poisoned")
            .values()
            .filter(|row| &row.match_id == match_id)
            .cloned()
            .collect())
    }

    async fn load_by_ids(&self, event_ids: &[i64]) -> Result<Vec<ProjectionRow>> {
        let store = self.rows.lock().expect("projection store mutex poisoned");
        Ok(event_ids
            .iter()
            .filter_map(|id| store.get(id).cloned())
            .collect())
    }
}
