//! Participant state
//!
//! One record per joined connection. The connection identifier stays
//! server-side; clients only ever see the [`ParticipantSummary`] projection.

use crate::protocol::ParticipantSummary;

/// A joined participant within one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Identifier of the connection this participant is bound to
    pub connection_id: u64,

    /// Display name, unique within the room
    pub username: String,

    /// Accumulated score (starts at 0, only ever incremented)
    pub score: u32,
}

impl Participant {
    /// Create a new participant with a zero score
    pub fn new(connection_id: u64, username: String) -> Self {
        Self {
            connection_id,
            username,
            score: 0,
        }
    }

    /// Client-facing projection of this participant
    pub fn summary(&self) -> ParticipantSummary {
        ParticipantSummary {
            username: self.username.clone(),
            score: self.score,
        }
    }
}
