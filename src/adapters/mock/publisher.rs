use std::sync::Mutex;

use crate::domain::value_objects::MatchId;
use crate::ports::projection_store::ProjectionRow;
use crate::ports::publisher::{MessageType, Publisher as PublisherTrait, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One recorded bus message with the headers a real broker would carry
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub match_id: MatchId,
    pub message_type: MessageType,
    pub rows: Vec<ProjectionRow>,
    pub timestamp: DateTime<Utc>,
}

/// Mock implementation of Publisher
///
/// Records every message instead of talking to a broker.
/// Tests assert on the recorded sequence.
#[allow(dead_code)]
#[derive(Default)]
pub struct Publisher {
    messages: Mutex<Vec<PublishedMessage>>,
}

#[allow(dead_code)]
impl Publisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far, in order
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.messages
            .lock()
            .expect("publisher mutex poisoned")
            .clone()
    }

    /// Messages published for one match, in order
    pub fn messages_for(&self, match_id: &MatchId) -> Vec<PublishedMessage> {
        self.messages()
            .into_iter()
            .filter(|m| &m.match_id == match_id)
            .collect()
    }
}

#[async_trait]
impl PublisherTrait for Publisher {
    async fn publish(
        &self,
        match_id: &MatchId,
        message_type: MessageType,
        rows: &[ProjectionRow],
    ) -> Result<()> {
        self.messages
            .lock()
            .expect("publisher mutex poisoned")
            .push(PublishedMessage {
                match_id: match_id.clone(),
                message_type,
                rows: rows.to_vec(),
                timestamp: Utc::now(),
            });
        Ok(())
    }
}
