//! Storage port: everything the controller needs from persistence.
//!
//! Implementations decide the backing technology. Writes that can race
//! (`save_matches`, `update_match`, `commit`) are compare-and-set operations and
//! must either apply completely or not at all.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    Match, MatchId, ParticipantId, Team, Tournament, TournamentError, TournamentId,
    TournamentStatus, UserStats,
};
use std::collections::HashMap;

/// A reported result, written as one atomic unit: the match and both players' stats.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultCommit {
    pub tournament_id: TournamentId,
    /// The match as it was read. The commit is rejected if the stored match differs.
    pub expected: Match,
    pub updated: Match,
    /// Stats as they were read. The commit is rejected if any stored entry differs.
    pub prior_stats: HashMap<ParticipantId, UserStats>,
    pub updated_stats: HashMap<ParticipantId, UserStats>,
}

pub trait TournamentStore {
    /// Fails with `NotFound` for an unknown id.
    fn load_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError>;

    /// Persist generated fixtures and mark the tournament `InProgress` in the same write.
    /// Fails with `AlreadyStarted` if the tournament already has matches, `InvalidState`
    /// if it is `Completed`.
    fn save_matches(&self, id: TournamentId, matches: Vec<Match>) -> Result<(), TournamentError>;

    fn load_match(&self, id: TournamentId, match_id: MatchId) -> Result<Match, TournamentError>;

    /// Stats for each requested participant. Unknown participants read as zero.
    fn load_stats(
        &self,
        ids: &[ParticipantId],
    ) -> Result<HashMap<ParticipantId, UserStats>, TournamentError>;

    /// Atomically write a reported match and its stats. Fails with `Conflict` if
    /// either changed since it was read.
    fn commit(&self, commit: ResultCommit) -> Result<(), TournamentError>;

    fn insert_tournament(&self, tournament: Tournament) -> Result<(), TournamentError>;

    /// All tournaments, oldest first.
    fn list_tournaments(&self) -> Result<Vec<Tournament>, TournamentError>;

    /// Register a participant (no-op if already registered) and return the updated tournament.
    /// Fails with `AlreadyStarted` if the tournament has matches, `InvalidState` if it is not open.
    fn add_player(
        &self,
        id: TournamentId,
        participant: ParticipantId,
    ) -> Result<Tournament, TournamentError>;

    /// Replace a single match if it still equals `expected`, else `Conflict`.
    fn update_match(
        &self,
        id: TournamentId,
        expected: &Match,
        updated: Match,
    ) -> Result<(), TournamentError>;

    fn set_status(&self, id: TournamentId, status: TournamentStatus) -> Result<(), TournamentError>;

    /// Mark the tournament `Completed` if every match has a result, checked and written
    /// in one step. Returns whether this call made the transition.
    fn complete_if_finished(&self, id: TournamentId) -> Result<bool, TournamentError>;

    fn all_stats(&self) -> Result<HashMap<ParticipantId, UserStats>, TournamentError>;

    fn insert_team(&self, team: Team) -> Result<(), TournamentError>;

    /// All teams, ordered by name.
    fn list_teams(&self) -> Result<Vec<Team>, TournamentError>;
}
