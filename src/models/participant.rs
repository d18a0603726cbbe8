//! Participants, their aggregate win/loss counters, and teams.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for anything that can play a match (a user or a team).
pub type ParticipantId = Uuid;

/// Unique identifier for a team. Teams enter tournaments under this id.
pub type TeamId = Uuid;

/// Aggregate record of a participant across every tournament they play in.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub wins: u32,
    pub losses: u32,
}

impl UserStats {
    pub fn new(wins: u32, losses: u32) -> Self {
        Self { wins, losses }
    }

    /// Record a win. Saturates at `u32::MAX`.
    pub fn add_win(&mut self) {
        self.wins = self.wins.saturating_add(1);
    }

    /// Record a loss. Saturates at `u32::MAX`.
    pub fn add_loss(&mut self) {
        self.losses = self.losses.saturating_add(1);
    }

    pub fn played(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }
}

/// A named group of users. The creator is always the first member.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub creator_id: ParticipantId,
    pub members: Vec<ParticipantId>,
}

impl Team {
    /// Create a team with a fresh id; `name` is expected to be trimmed already.
    pub fn new(name: impl Into<String>, creator_id: ParticipantId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            creator_id,
            members: vec![creator_id],
        }
    }

    /// The id this team plays under.
    pub fn participant_id(&self) -> ParticipantId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_only_increase() {
        let mut s = UserStats::default();
        s.add_win();
        s.add_loss();
        s.add_win();
        assert_eq!(s, UserStats::new(2, 1));
        assert_eq!(s.played(), 3);
    }

    #[test]
    fn counters_saturate_at_max() {
        let mut s = UserStats::new(u32::MAX, u32::MAX);
        s.add_win();
        s.add_loss();
        assert_eq!(s, UserStats::new(u32::MAX, u32::MAX));
        assert_eq!(s.played(), u32::MAX);
    }

    #[test]
    fn team_creator_is_first_member() {
        let creator = Uuid::new_v4();
        let team = Team::new("Night Owls", creator);
        assert_eq!(team.members, vec![creator]);
        assert_eq!(team.participant_id(), team.id);
    }
}
