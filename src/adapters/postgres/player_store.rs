use crate::ports::player_store::{
    PlayerRecord, PlayerStore as PlayerStoreTrait, Result, TeamRecord,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// PostgreSQL implementation of PlayerStore
///
/// Reference data writes issued by the fallback self-healing path.
#[allow(dead_code)]
pub struct PlayerStore {
    pool: PgPool,
}

#[allow(dead_code)]
impl PlayerStore {
    /// Create a new PlayerStore with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerStoreTrait for PlayerStore {
    /// Upsert a player record, overwriting with the latest roster data
    async fn upsert_player(&self, player: PlayerRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO players (
                player_id, team_id, first_name, last_name, match_name, shirt_number
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (player_id)
            DO UPDATE SET
                team_id = EXCLUDED.team_id,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                match_name = EXCLUDED.match_name,
                shirt_number = EXCLUDED.shirt_number
            "#,
        )
        .bind(&player.player_id)
        .bind(&player.team_id)
        .bind(&player.first_name)
        .bind(&player.last_name)
        .bind(&player.match_name)
        .bind(player.shirt_number)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Upsert a team record
    async fn upsert_team(&self, team: TeamRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO teams (team_id, name, short_name, official_name, country)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (team_id)
            DO UPDATE SET
                name = EXCLUDED.name,
                short_name = EXCLUDED.short_name,
                official_name = EXCLUDED.official_name,
                country = EXCLUDED.country
            "#,
        )
        .bind(&team.team_id)
        .bind(&team.name)
        .bind(&team.short_name)
        .bind(&team.official_name)
        .bind(&team.country)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load all players belonging to a team
    async fn load_players_by_team(&self, team_id: &str) -> Result<Vec<PlayerRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT player_id, team_id, first_name, last_name, match_name, shirt_number
            FROM players
            WHERE team_id = $1
            ORDER BY shirt_number ASC NULLS LAST
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| PlayerRecord {
                player_id: row.get("player_id"),
                team_id: row.get("team_id"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
                match_name: row.get("match_name"),
                shirt_number: row.get("shirt_number"),
            })
            .collect())
    }
}
