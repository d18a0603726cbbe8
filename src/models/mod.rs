//! Data structures for tournaments: participants, matches, tournament state.

mod game;
mod participant;
mod tournament;

pub use game::{Match, MatchId, MatchState};
pub use participant::{ParticipantId, Team, TeamId, UserStats};
pub use tournament::{Format, Resource, Tournament, TournamentError, TournamentId, TournamentStatus};
