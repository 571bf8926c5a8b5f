use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::ports::player_store::{
    PlayerRecord, PlayerStore as PlayerStoreTrait, Result, TeamRecord,
};
use async_trait::async_trait;

/// Mock implementation of PlayerStore
///
/// In-memory upsert maps for players and teams.
#[allow(dead_code)]
#[derive(Default)]
pub struct PlayerStore {
    players: Mutex<BTreeMap<String, PlayerRecord>>,
    teams: Mutex<BTreeMap<String, TeamRecord>>,
}

#[allow(dead_code)]
impl PlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored player by internal id
    pub fn player(&self, player_id: &str) -> Option<PlayerRecord> {
        self.players
            .lock()
            .expect("player store mutex poisoned")
            .get(player_id)
            .cloned()
    }

    /// All stored players, ordered by id
    pub fn players(&self) -> Vec<PlayerRecord> {
        self.players
            .lock()
            .expect("player store mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PlayerStoreTrait for PlayerStore {
    async fn upsert_player(&self, player: PlayerRecord) -> Result<()> {
        self.players
            .lock()
            .expect("player store mutex poisoned")
            .insert(player.player_id.clone(), player);
        Ok(())
    }

    async fn upsert_team(&self, team: TeamRecord) -> Result<()> {
        self.teams
            .lock()
            .expect("player store mutex poisoned")
            .insert(team.team_id.clone(), team);
        Ok(())
    }

    async fn load_players_by_team(&self, team_id: &str) -> Result<Vec<PlayerRecord>> {
        Ok(self
            .players
            .lock()
            .expect("player store mutex poisoned")
            .values()
            .filter(|player| player.team_id == team_id)
            .cloned()
            .collect())
    }
}
