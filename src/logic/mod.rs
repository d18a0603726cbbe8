//! Tournament business logic: fixture generation and standings. Pure, no storage access.

mod fixtures;
mod standings;

pub use fixtures::{expected_match_count, first_round_byes, generate_fixtures};
pub use standings::{
    apply_result, rank_leaderboard, tournament_standings, LeaderboardEntry, StandingRow,
};
