//! Match (fixture) and its lifecycle state.

use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sequence index of a match within its tournament. Assigned at generation, never reused.
pub type MatchId = u32;

/// Lifecycle of a match: `NoShow` -> (`InProgress`) -> `Reported`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    /// Scheduled, no result yet.
    #[default]
    NoShow,
    /// Play has started.
    InProgress,
    /// Terminal: a winner has been recorded.
    Reported,
}

impl MatchState {
    pub fn is_terminal(self) -> bool {
        self == MatchState::Reported
    }
}

/// One scheduled contest between two distinct participants.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub participants: [ParticipantId; 2],
    pub state: MatchState,
    /// Set exactly once, when the result is reported. Always one of `participants`.
    pub winner: Option<ParticipantId>,
    pub reported_at: Option<DateTime<Utc>>,
}

impl Match {
    /// A fresh fixture in `NoShow`. Callers guarantee `home != away`.
    pub fn new(id: MatchId, home: ParticipantId, away: ParticipantId) -> Self {
        Self {
            id,
            participants: [home, away],
            state: MatchState::NoShow,
            winner: None,
            reported_at: None,
        }
    }

    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.participants.contains(&participant)
    }

    /// The other side of the match, or `None` if `participant` is not playing in it.
    pub fn opponent_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        match self.participants {
            [a, b] if a == participant => Some(b),
            [a, b] if b == participant => Some(a),
            _ => None,
        }
    }

    pub fn loser(&self) -> Option<ParticipantId> {
        self.winner.and_then(|w| self.opponent_of(w))
    }

    pub fn is_reported(&self) -> bool {
        self.winner.is_some()
    }
}
