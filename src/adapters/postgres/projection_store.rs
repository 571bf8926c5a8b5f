use std::collections::HashSet;

use crate::domain::value_objects::MatchId;
use crate::ports::projection_store::{
    ProjectionRow, ProjectionStore as ProjectionStoreTrait, Result,
};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Convert a database row into a ProjectionRow
fn map_row(row: &PgRow) -> Result<ProjectionRow> {
    let qualifiers: serde_json::Value = row.get("qualifiers");
    let qualifiers = serde_json::from_value(qualifiers)?;

    Ok(ProjectionRow {
        match_id: MatchId::new(row.get::<String, _>("match_id")),
        event_id: row.get("event_id"),
        local_event_id: row.get("local_event_id"),
        type_id: row.get("type_id"),
        period_id: row.get("period_id"),
        time_min: row.get("time_min"),
        time_sec: row.get("time_sec"),
        contestant_id: row.get("contestant_id"),
        player_id: row.get("player_id"),
        player_name: row.get("player_name"),
        outcome: row.get("outcome"),
        x: row.get("x"),
        y: row.get("y"),
        qualifiers,
        time_stamp: row.get("time_stamp"),
        last_modified: row.get("last_modified"),
    })
}

/// PostgreSQL implementation of ProjectionStore
///
/// The read side of the pipeline: a denormalized current-state view,
/// one row per feed event, keyed by the provider's global event id.
#[allow(dead_code)]
pub struct ProjectionStore {
    pool: PgPool,
}

#[allow(dead_code)]
impl ProjectionStore {
    /// Create a new ProjectionStore with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectionStoreTrait for ProjectionStore {
    /// Upsert a batch of projection rows
    ///
    /// Uses INSERT ... ON CONFLICT (event_id) DO UPDATE so repeated
    /// upserts never duplicate rows. Duplicates within one batch keep
    /// the first occurrence and log a warning. The whole batch runs in
    /// a single transaction: all rows land or none do.
    async fn upsert_many(&self, rows: Vec<ProjectionRow>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let mut unique_rows = Vec::with_capacity(rows.len());
        for row in rows {
            if !seen.insert(row.event_id) {
                tracing::warn!(event_id = row.event_id, "duplicate event in upsert batch");
                continue;
            }
            unique_rows.push(row);
        }

        let mut tx = self.pool.begin().await?;

        for row in &unique_rows {
            let qualifiers = serde_json::to_value(&row.qualifiers)?;
            sqlx::query(
                r#"
                INSERT INTO match_projections (
                    event_id,
                    match_id,
                    local_event_id,
                    type_id,
                    period_id,
                    time_min,
                    time_sec,
                    contestant_id,
                    player_id,
                    player_name,
                    outcome,
                    x,
                    y,
                    qualifiers,
                    time_stamp,
                    last_modified
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
                ON CONFLICT (event_id)
                DO UPDATE SET
                    match_id = EXCLUDED.match_id,
                    local_event_id = EXCLUDED.local_event_id,
                    type_id = EXCLUDED.type_id,
                    period_id = EXCLUDED.period_id,
                    time_min = EXCLUDED.time_min,
                    time_sec = EXCLUDED.time_sec,
                    contestant_id = EXCLUDED.contestant_id,
                    player_id = EXCLUDED.player_id,
                    player_name = EXCLUDED.player_name,
                    outcome = EXCLUDED.outcome,
                    x = EXCLUDED.x,
                    y = EXCLUDED.y,
                    qualifiers = EXCLUDED.qualifiers,
                    time_stamp = EXCLUDED.time_stamp,
                    last_modified = EXCLUDED.last_modified
                "#,
            )
            .bind(row.event_id)
            .bind(row.match_id.value())
            .bind(row.local_event_id)
            .bind(row.type_id)
            .bind(row.period_id)
            .bind(row.time_min)
            .bind(row.time_sec)
            .bind(&row.contestant_id)
            .bind(&row.player_id)
            .bind(&row.player_name)
            .bind(row.outcome)
            .bind(row.x)
            .bind(row.y)
            .bind(&qualifiers)
            .bind(&row.time_stamp)
            .bind(&row.last_modified)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load all projection rows for a match
    async fn load_by_match(&self, match_id: &MatchId) -> Result<Vec<ProjectionRow>> {
        let rows = sqlx::query(
            r#"
            SELECT
                event_id, match_id, local_event_id, type_id, period_id,
                time_min, time_sec, contestant_id, player_id, player_name,
                outcome, x, y, qualifiers, time_stamp, last_modified
            FROM match_projections
            WHERE match_id = $1
            ORDER BY event_id ASC
            "#,
        )
        .bind(match_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    /// Load projection rows by their event ids
    ///
    /// Ids with no matching row are simply absent from the result.
    async fn load_by_ids(&self, event_ids: &[i64]) -> Result<Vec<ProjectionRow>> {
        let rows = sqlx::query(
            r#"
            SELECT
                event_id, match_id, local_event_id, type_id, period_id,
                time_min, time_sec, contestant_id, player_id, player_name,
                outcome, x, y, qualifiers, time_stamp, last_modified
            FROM match_projections
            WHERE event_id = ANY($1)
            ORDER BY event_id ASC
            "#,
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }
}
