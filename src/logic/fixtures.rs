//! Fixture generation: the initial set of matches for a tournament.

use crate::models::{Format, Match, MatchId, ParticipantId, TournamentError};
use std::collections::HashSet;

/// Generate the initial fixtures for `players` in the given format.
///
/// Pure and deterministic: the same player order always yields the same matches
/// and ids. Ids are a zero-based running counter in emission order, and every
/// match starts in `NoShow`.
///
/// - Round-robin: one match per pair `(players[i], players[j])` with `i < j`.
/// - Single elimination: first round only, consecutive players paired up. With an
///   odd count the last player has a bye and appears in no match.
pub fn generate_fixtures(
    players: &[ParticipantId],
    format: Format,
) -> Result<Vec<Match>, TournamentError> {
    if players.len() < 2 {
        return Err(TournamentError::InsufficientPlayers { found: players.len() });
    }
    let mut seen = HashSet::with_capacity(players.len());
    for &p in players {
        if !seen.insert(p) {
            return Err(TournamentError::DuplicateParticipant(p));
        }
    }

    Ok(match format {
        Format::RoundRobin => round_robin(players),
        Format::SingleElimination => first_round_pairs(players),
    })
}

fn round_robin(players: &[ParticipantId]) -> Vec<Match> {
    let mut matches = Vec::with_capacity(players.len() * (players.len() - 1) / 2);
    for (i, &home) in players.iter().enumerate() {
        for &away in &players[i + 1..] {
            let id = matches.len() as MatchId;
            matches.push(Match::new(id, home, away));
        }
    }
    matches
}

fn first_round_pairs(players: &[ParticipantId]) -> Vec<Match> {
    players
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| Match::new(i as MatchId, pair[0], pair[1]))
        .collect()
}

/// Players left without a first-round match (the trailing player when the count is odd).
pub fn first_round_byes(players: &[ParticipantId], format: Format) -> Vec<ParticipantId> {
    match format {
        Format::SingleElimination => players.chunks_exact(2).remainder().to_vec(),
        Format::RoundRobin => Vec::new(),
    }
}

/// Number of matches `generate_fixtures` produces for `n` distinct players.
pub fn expected_match_count(n: usize, format: Format) -> usize {
    match format {
        Format::RoundRobin => n * n.saturating_sub(1) / 2,
        Format::SingleElimination => n / 2,
    }
}
