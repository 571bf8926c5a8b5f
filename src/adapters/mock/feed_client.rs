use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::domain::value_objects::MatchId;
use crate::ports::feed_client::{
    FeedClient as FeedClientTrait, MatchEventsFeed, Result, TournamentSchedule,
};
use async_trait::async_trait;

/// Mock implementation of FeedClient
///
/// Serves scripted snapshots: each fetch pops the next queued snapshot
/// for the match; once the queue is down to its last snapshot that
/// snapshot is repeated, mimicking a feed that keeps returning the
/// final accumulated state.
#[allow(dead_code)]
#[derive(Default)]
pub struct FeedClient {
    snapshots: Mutex<HashMap<String, VecDeque<MatchEventsFeed>>>,
    schedule: Mutex<Option<TournamentSchedule>>,
    fail_fetches: Mutex<u32>,
}

#[allow(dead_code)]
impl FeedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot to be served for a match
    pub fn push_snapshot(&self, match_id: &MatchId, feed: MatchEventsFeed) {
        self.snapshots
            .lock()
            .expect("feed client mutex poisoned")
            .entry(match_id.value().to_string())
            .or_default()
            .push_back(feed);
    }

    /// Set the tournament schedule returned by fetch_tournament_schedule
    pub fn set_schedule(&self, schedule: TournamentSchedule) {
        *self.schedule.lock().expect("feed client mutex poisoned") = Some(schedule);
    }

    /// Make the next `count` fetches fail with a transient error
    pub fn fail_next_fetches(&self, count: u32) {
        *self.fail_fetches.lock().expect("feed client mutex poisoned") = count;
    }
}

#[async_trait]
impl FeedClientTrait for FeedClient {
    async fn fetch_match_events(&self, match_id: &MatchId) -> Result<MatchEventsFeed> {
        {
            let mut fail = self.fail_fetches.lock().expect("feed client mutex poisoned");
            if *fail > 0 {
                *fail -= 1;
                return Err("simulated feed outage".into());
            }
        }

        let mut snapshots = self.snapshots.lock().expect("feed client mutex poisoned");
        let queue = snapshots.entry(match_id.value().to_string()).or_default();

        let feed = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };
        Ok(feed)
    }

    async fn fetch_tournament_schedule(&self, _tournament_id: &str) -> Result<TournamentSchedule> {
        Ok(self
            .schedule
            .lock()
            .expect("feed client mutex poisoned")
            .clone()
            .unwrap_or_default())
    }
}
