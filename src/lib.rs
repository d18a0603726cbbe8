//! Tournament organizer: library with models, fixture/standings logic, storage port and controller.

pub mod controller;
pub mod logic;
pub mod models;
pub mod store;

pub use controller::TournamentController;
pub use logic::{
    apply_result, expected_match_count, first_round_byes, generate_fixtures, rank_leaderboard,
    tournament_standings, LeaderboardEntry, StandingRow,
};
pub use models::{
    Format, Match, MatchId, MatchState, ParticipantId, Resource, Team, TeamId, Tournament,
    TournamentError, TournamentId, TournamentStatus, UserStats,
};
pub use store::{MemoryStore, ResultCommit, TournamentStore};
