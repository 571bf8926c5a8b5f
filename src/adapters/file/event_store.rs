use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::events::DomainEvent;
use crate::domain::value_objects::MatchId;
use crate::ports::event_store::{EventStore as EventStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

/// One stored event row, mirroring the database layout:
/// metadata beside a variant-specific payload keyed by event_type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEventRow {
    event_type: String,
    domain_event_id: Uuid,
    occurred_on: DateTime<Utc>,
    payload: serde_json::Value,
}

/// File-backed implementation of EventStore
///
/// Keeps the full log in memory and persists the whole map to a single
/// JSON file on every mutation. Used by replay tooling and tests; the
/// contract is identical to the PostgreSQL implementation.
///
/// On-disk format:
/// ```json
/// {
///   "match-123": [
///     {"event_type": "GlobalEventAdded", "domain_event_id": "...",
///      "occurred_on": "...", "payload": {...}}
///   ]
/// }
/// ```
pub struct FileEventStore {
    path: PathBuf,
    storage: Mutex<HashMap<String, Vec<StoredEventRow>>>,
}

impl FileEventStore {
    /// Open the store, loading any existing log from the file
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let storage = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(Box::new(e)),
        };

        Ok(Self {
            path,
            storage: Mutex::new(storage),
        })
    }

    async fn persist(&self, storage: &HashMap<String, Vec<StoredEventRow>>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(storage)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl EventStoreTrait for FileEventStore {
    /// Append events for a match
    ///
    /// The batch is committed to memory only after the file write
    /// succeeds, so a failed persist leaves no partial batch visible.
    async fn append(&self, match_id: &MatchId, events: Vec<DomainEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut guard = self.storage.lock().await;

        let mut next = guard.clone();
        let entry = next.entry(match_id.value().to_string()).or_default();
        for event in &events {
            entry.push(StoredEventRow {
                event_type: event.event_type().to_string(),
                domain_event_id: event.domain_event_id,
                occurred_on: event.occurred_on,
                payload: event.payload()?,
            });
        }

        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    /// Load all events for a match in insertion order
    async fn load(&self, match_id: &MatchId) -> Result<Vec<DomainEvent>> {
        let guard = self.storage.lock().await;
        let rows = guard.get(match_id.value()).cloned().unwrap_or_default();
        drop(guard);

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(DomainEvent::from_payload(
                &row.event_type,
                row.domain_event_id,
                match_id.clone(),
                row.occurred_on,
                row.payload,
            )?);
        }
        Ok(events)
    }

    /// Delete all events for a match (idempotent)
    async fn delete(&self, match_id: &MatchId) -> Result<()> {
        let mut guard = self.storage.lock().await;
        let mut next = guard.clone();
        next.remove(match_id.value());
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }
}
