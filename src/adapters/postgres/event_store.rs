use crate::domain::events::DomainEvent;
use crate::domain::value_objects::MatchId;
use crate::ports::event_store::{EventStore as EventStoreTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// PostgreSQL implementation of EventStore
///
/// Stores domain events in an append-only event log.
/// Payloads are serialized as JSONB for flexible schema evolution;
/// the event_type column is the variant discriminator.
#[allow(dead_code)]
pub struct EventStore {
    pool: PgPool,
}

#[allow(dead_code)]
impl EventStore {
    /// Create a new EventStore with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStoreTrait for EventStore {
    /// Append events to the event store
    ///
    /// All events in the batch are stored atomically within a transaction:
    /// either every event is appended or none is. Insertion order within
    /// the batch is preserved by the sequence_number column.
    async fn append(&self, match_id: &MatchId, events: Vec<DomainEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for event in &events {
            let payload = event.payload()?;
            sqlx::query(
                r#"
                INSERT INTO domain_events (
                    domain_event_id,
                    aggregate_id,
                    event_type,
                    occurred_on,
                    payload
                )
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(event.domain_event_id)
            .bind(match_id.value())
            .bind(event.event_type())
            .bind(event.occurred_on)
            .bind(&payload)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load all events for a match in chronological order
    ///
    /// Ordered by occurred_on ascending with sequence_number as a stable
    /// tiebreak for events emitted within the same instant.
    async fn load(&self, match_id: &MatchId) -> Result<Vec<DomainEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT domain_event_id, event_type, occurred_on, payload
            FROM domain_events
            WHERE aggregate_id = $1
            ORDER BY occurred_on ASC, sequence_number ASC
            "#,
        )
        .bind(match_id.value())
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let domain_event_id: Uuid = row.get("domain_event_id");
            let event_type: String = row.get("event_type");
            let occurred_on: DateTime<Utc> = row.get("occurred_on");
            let payload: serde_json::Value = row.get("payload");

            let event = DomainEvent::from_payload(
                &event_type,
                domain_event_id,
                match_id.clone(),
                occurred_on,
                payload,
            )?;
            events.push(event);
        }

        Ok(events)
    }

    /// Delete all events for a match
    ///
    /// Idempotent. Used by replay harnesses and tests only.
    async fn delete(&self, match_id: &MatchId) -> Result<()> {
        sqlx::query("DELETE FROM domain_events WHERE aggregate_id = $1")
            .bind(match_id.value())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
