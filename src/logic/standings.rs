//! Result recording and standings: apply a match outcome to win/loss counters, rank participants.

use crate::models::{Match, MatchState, ParticipantId, Tournament, TournamentError, UserStats};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Record `winner` as the result of `m` and apply it to `stats`.
///
/// Validates before touching anything: on error neither `m` nor `stats` changes.
/// On success the winner gains one win, the opponent one loss, and `m` moves to
/// `Reported`. Participants missing from `stats` start from zero. No other entry
/// in `stats` is touched. A match whose two sides are the same participant is
/// rejected with `InvalidState`.
pub fn apply_result(
    m: &mut Match,
    winner: ParticipantId,
    stats: &mut HashMap<ParticipantId, UserStats>,
) -> Result<(), TournamentError> {
    if m.winner.is_some() || m.state.is_terminal() {
        return Err(TournamentError::AlreadyReported(m.id));
    }
    if m.participants[0] == m.participants[1] {
        return Err(TournamentError::InvalidState);
    }
    let loser = m
        .opponent_of(winner)
        .ok_or(TournamentError::InvalidWinner(winner))?;

    stats.entry(winner).or_default().add_win();
    stats.entry(loser).or_default().add_loss();
    m.winner = Some(winner);
    m.state = MatchState::Reported;
    Ok(())
}

/// One row of a tournament's standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub participant: ParticipantId,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
}

/// Standings within a single tournament, derived from its reported matches.
///
/// Every registered player gets a row. Ordered by wins (desc), then losses (asc),
/// then registration order.
pub fn tournament_standings(tournament: &Tournament) -> Vec<StandingRow> {
    let mut rows: Vec<StandingRow> = tournament
        .players
        .iter()
        .map(|&participant| StandingRow {
            participant,
            played: 0,
            wins: 0,
            losses: 0,
        })
        .collect();

    for m in tournament.matches.iter().filter(|m| m.is_reported()) {
        let (Some(winner), Some(loser)) = (m.winner, m.loser()) else {
            continue;
        };
        for row in rows.iter_mut() {
            if row.participant == winner {
                row.wins += 1;
                row.played += 1;
            } else if row.participant == loser {
                row.losses += 1;
                row.played += 1;
            }
        }
    }

    // Stable sort keeps registration order for ties.
    rows.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.losses.cmp(&b.losses)));
    rows
}

/// A participant's place in the global leaderboard.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based.
    pub rank: usize,
    pub participant: ParticipantId,
    pub wins: u32,
    pub losses: u32,
}

/// Rank everyone by wins (desc), then losses (asc), then id for a stable order.
pub fn rank_leaderboard(stats: &HashMap<ParticipantId, UserStats>) -> Vec<LeaderboardEntry> {
    let mut all: Vec<(ParticipantId, UserStats)> = stats.iter().map(|(id, s)| (*id, *s)).collect();
    all.sort_by(|(a_id, a), (b_id, b)| {
        b.wins
            .cmp(&a.wins)
            .then(a.losses.cmp(&b.losses))
            .then(a_id.cmp(b_id))
    });
    all.into_iter()
        .enumerate()
        .map(|(i, (participant, s))| LeaderboardEntry {
            rank: i + 1,
            participant,
            wins: s.wins,
            losses: s.losses,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Format;
    use uuid::Uuid;

    #[test]
    fn standings_count_only_reported_matches() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut t = Tournament::with_players("Cup", Format::RoundRobin, vec![a, b, c]);
        t.matches = vec![Match::new(0, a, b), Match::new(1, a, c), Match::new(2, b, c)];
        let mut scratch = HashMap::new();
        apply_result(&mut t.matches[0], b, &mut scratch).unwrap();
        apply_result(&mut t.matches[2], b, &mut scratch).unwrap();
        t.matches[1].state = MatchState::InProgress;

        let rows = tournament_standings(&t);
        assert_eq!(rows[0].participant, b);
        assert_eq!((rows[0].wins, rows[0].losses, rows[0].played), (2, 0, 2));
        // a and c both lost once; a registered first.
        assert_eq!(rows[1].participant, a);
        assert_eq!(rows[2].participant, c);
        assert_eq!((rows[2].wins, rows[2].losses), (0, 1));
    }

    #[test]
    fn leaderboard_breaks_ties_on_losses() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let stats = HashMap::from([
            (a, UserStats::new(3, 4)),
            (b, UserStats::new(3, 1)),
            (c, UserStats::new(5, 9)),
        ]);
        let board = rank_leaderboard(&stats);
        let order: Vec<_> = board.iter().map(|e| e.participant).collect();
        assert_eq!(order, vec![c, b, a]);
        assert_eq!(board.iter().map(|e| e.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
