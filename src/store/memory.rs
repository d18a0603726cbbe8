//! In-process store: everything behind one `RwLock`, lost on restart.

use crate::models::{
    Match, MatchId, ParticipantId, Resource, Team, TeamId, Tournament, TournamentError,
    TournamentId, TournamentStatus, UserStats,
};
use crate::store::{ResultCommit, TournamentStore};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct StoreState {
    tournaments: HashMap<TournamentId, Tournament>,
    stats: HashMap<ParticipantId, UserStats>,
    teams: HashMap<TeamId, Team>,
}

impl StoreState {
    fn tournament_mut(&mut self, id: TournamentId) -> Result<&mut Tournament, TournamentError> {
        self.tournaments
            .get_mut(&id)
            .ok_or(TournamentError::NotFound(Resource::Tournament(id)))
    }
}

/// Thread-safe in-memory `TournamentStore`. Each write holds the lock for its whole
/// check-then-apply, which is what makes the compare-and-set writes atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, TournamentError> {
        self.state.read().map_err(|_| TournamentError::StoreUnavailable)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, TournamentError> {
        self.state.write().map_err(|_| TournamentError::StoreUnavailable)
    }
}

impl TournamentStore for MemoryStore {
    fn load_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.read()?
            .tournaments
            .get(&id)
            .cloned()
            .ok_or(TournamentError::NotFound(Resource::Tournament(id)))
    }

    fn save_matches(&self, id: TournamentId, matches: Vec<Match>) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        let t = g.tournament_mut(id)?;
        if t.has_started() {
            return Err(TournamentError::AlreadyStarted);
        }
        if t.status == TournamentStatus::Completed {
            return Err(TournamentError::InvalidState);
        }
        t.matches = matches;
        t.status = TournamentStatus::InProgress;
        Ok(())
    }

    fn load_match(&self, id: TournamentId, match_id: MatchId) -> Result<Match, TournamentError> {
        let g = self.read()?;
        let t = g
            .tournaments
            .get(&id)
            .ok_or(TournamentError::NotFound(Resource::Tournament(id)))?;
        t.get_match(match_id)
            .cloned()
            .ok_or(TournamentError::NotFound(Resource::Match(id, match_id)))
    }

    fn load_stats(
        &self,
        ids: &[ParticipantId],
    ) -> Result<HashMap<ParticipantId, UserStats>, TournamentError> {
        let g = self.read()?;
        Ok(ids
            .iter()
            .map(|id| (*id, g.stats.get(id).copied().unwrap_or_default()))
            .collect())
    }

    fn commit(&self, commit: ResultCommit) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        let stats_unchanged = commit
            .prior_stats
            .iter()
            .all(|(id, prior)| g.stats.get(id).copied().unwrap_or_default() == *prior);
        let tid = commit.tournament_id;
        let mid = commit.expected.id;
        let stored = g
            .tournament_mut(tid)?
            .get_match_mut(mid)
            .ok_or(TournamentError::NotFound(Resource::Match(tid, mid)))?;
        if *stored != commit.expected || !stats_unchanged {
            log::debug!("Rejected result for match {} in tournament {}: stale read", mid, tid);
            return Err(TournamentError::Conflict);
        }
        *stored = commit.updated;
        g.stats.extend(commit.updated_stats);
        Ok(())
    }

    fn insert_tournament(&self, tournament: Tournament) -> Result<(), TournamentError> {
        self.write()?.tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    fn list_tournaments(&self) -> Result<Vec<Tournament>, TournamentError> {
        let mut all: Vec<Tournament> = self.read()?.tournaments.values().cloned().collect();
        all.sort_by_key(|t| t.created_at);
        Ok(all)
    }

    fn add_player(
        &self,
        id: TournamentId,
        participant: ParticipantId,
    ) -> Result<Tournament, TournamentError> {
        let mut g = self.write()?;
        let t = g.tournament_mut(id)?;
        t.add_player(participant)?;
        Ok(t.clone())
    }

    fn update_match(
        &self,
        id: TournamentId,
        expected: &Match,
        updated: Match,
    ) -> Result<(), TournamentError> {
        let mut g = self.write()?;
        let stored = g
            .tournament_mut(id)?
            .get_match_mut(expected.id)
            .ok_or(TournamentError::NotFound(Resource::Match(id, expected.id)))?;
        if *stored != *expected {
            return Err(TournamentError::Conflict);
        }
        *stored = updated;
        Ok(())
    }

    fn set_status(&self, id: TournamentId, status: TournamentStatus) -> Result<(), TournamentError> {
        self.write()?.tournament_mut(id)?.status = status;
        Ok(())
    }

    fn complete_if_finished(&self, id: TournamentId) -> Result<bool, TournamentError> {
        let mut g = self.write()?;
        let t = g.tournament_mut(id)?;
        if !t.all_reported() || t.status == TournamentStatus::Completed {
            return Ok(false);
        }
        t.status = TournamentStatus::Completed;
        Ok(true)
    }

    fn all_stats(&self) -> Result<HashMap<ParticipantId, UserStats>, TournamentError> {
        Ok(self.read()?.stats.clone())
    }

    fn insert_team(&self, team: Team) -> Result<(), TournamentError> {
        self.write()?.teams.insert(team.id, team);
        Ok(())
    }

    fn list_teams(&self) -> Result<Vec<Team>, TournamentError> {
        let mut teams: Vec<Team> = self.read()?.teams.values().cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Format, MatchState};
    use uuid::Uuid;

    fn seeded() -> (MemoryStore, TournamentId, ParticipantId, ParticipantId) {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let store = MemoryStore::new();
        let t = Tournament::with_players("Cup", Format::SingleElimination, vec![a, b]);
        let id = t.id;
        store.insert_tournament(t).unwrap();
        store.save_matches(id, vec![Match::new(0, a, b)]).unwrap();
        (store, id, a, b)
    }

    fn reported(m: &Match, winner: ParticipantId) -> Match {
        Match {
            winner: Some(winner),
            state: MatchState::Reported,
            ..m.clone()
        }
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let (store, id, _, _) = seeded();
        let missing = Uuid::new_v4();
        assert_eq!(
            store.load_tournament(missing),
            Err(TournamentError::NotFound(Resource::Tournament(missing)))
        );
        assert_eq!(
            store.load_match(id, 7),
            Err(TournamentError::NotFound(Resource::Match(id, 7)))
        );
    }

    #[test]
    fn save_matches_refuses_second_generation() {
        let (store, id, a, b) = seeded();
        assert_eq!(
            store.save_matches(id, vec![Match::new(0, b, a)]),
            Err(TournamentError::AlreadyStarted)
        );
        assert_eq!(store.load_match(id, 0).unwrap().participants, [a, b]);
    }

    #[test]
    fn commit_applies_match_and_stats_together() {
        let (store, id, a, b) = seeded();
        let m = store.load_match(id, 0).unwrap();
        let prior = store.load_stats(&[a, b]).unwrap();
        let updated_stats = HashMap::from([(a, UserStats::new(1, 0)), (b, UserStats::new(0, 1))]);
        store
            .commit(ResultCommit {
                tournament_id: id,
                expected: m.clone(),
                updated: reported(&m, a),
                prior_stats: prior,
                updated_stats,
            })
            .unwrap();
        assert_eq!(store.load_match(id, 0).unwrap().winner, Some(a));
        assert_eq!(store.load_stats(&[a]).unwrap()[&a], UserStats::new(1, 0));
    }

    #[test]
    fn stale_commit_is_a_conflict_and_writes_nothing() {
        let (store, id, a, b) = seeded();
        let m = store.load_match(id, 0).unwrap();
        let prior = store.load_stats(&[a, b]).unwrap();
        let first = ResultCommit {
            tournament_id: id,
            expected: m.clone(),
            updated: reported(&m, a),
            prior_stats: prior.clone(),
            updated_stats: HashMap::from([(a, UserStats::new(1, 0)), (b, UserStats::new(0, 1))]),
        };
        let second = ResultCommit {
            updated: reported(&m, b),
            updated_stats: HashMap::from([(a, UserStats::new(0, 1)), (b, UserStats::new(1, 0))]),
            ..first.clone()
        };
        store.commit(first).unwrap();
        assert_eq!(store.commit(second), Err(TournamentError::Conflict));
        assert_eq!(store.load_match(id, 0).unwrap().winner, Some(a));
        assert_eq!(store.load_stats(&[b]).unwrap()[&b], UserStats::new(0, 1));
    }

    #[test]
    fn commit_detects_stats_changed_elsewhere() {
        let (store, id, a, b) = seeded();
        let m = store.load_match(id, 0).unwrap();
        let prior = store.load_stats(&[a, b]).unwrap();

        // A result in another tournament bumps `a` in between.
        let (c, d) = (a, Uuid::new_v4());
        let other = Tournament::with_players("Other", Format::SingleElimination, vec![c, d]);
        let other_id = other.id;
        store.insert_tournament(other).unwrap();
        store.save_matches(other_id, vec![Match::new(0, c, d)]).unwrap();
        let om = store.load_match(other_id, 0).unwrap();
        store
            .commit(ResultCommit {
                tournament_id: other_id,
                expected: om.clone(),
                updated: reported(&om, c),
                prior_stats: store.load_stats(&[c, d]).unwrap(),
                updated_stats: HashMap::from([(c, UserStats::new(1, 0)), (d, UserStats::new(0, 1))]),
            })
            .unwrap();

        let stale = ResultCommit {
            tournament_id: id,
            expected: m.clone(),
            updated: reported(&m, a),
            prior_stats: prior,
            updated_stats: HashMap::from([(a, UserStats::new(1, 0)), (b, UserStats::new(0, 1))]),
        };
        assert_eq!(store.commit(stale), Err(TournamentError::Conflict));
        assert_eq!(store.load_stats(&[a]).unwrap()[&a], UserStats::new(1, 0));
    }

    #[test]
    fn save_matches_marks_in_progress_and_refuses_completed() {
        let (store, id, _, _) = seeded();
        assert_eq!(store.load_tournament(id).unwrap().status, TournamentStatus::InProgress);

        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let done = Tournament::with_players("Done", Format::RoundRobin, vec![a, b]);
        let done_id = done.id;
        store.insert_tournament(done).unwrap();
        store.set_status(done_id, TournamentStatus::Completed).unwrap();
        assert_eq!(
            store.save_matches(done_id, vec![Match::new(0, a, b)]),
            Err(TournamentError::InvalidState)
        );
        let t = store.load_tournament(done_id).unwrap();
        assert!(t.matches.is_empty());
        assert_eq!(t.status, TournamentStatus::Completed);
    }

    #[test]
    fn complete_if_finished_flips_once() {
        let (store, id, a, b) = seeded();
        assert!(!store.complete_if_finished(id).unwrap());

        let m = store.load_match(id, 0).unwrap();
        store
            .commit(ResultCommit {
                tournament_id: id,
                expected: m.clone(),
                updated: reported(&m, b),
                prior_stats: store.load_stats(&[a, b]).unwrap(),
                updated_stats: HashMap::from([(a, UserStats::new(0, 1)), (b, UserStats::new(1, 0))]),
            })
            .unwrap();
        assert!(store.complete_if_finished(id).unwrap());
        assert!(!store.complete_if_finished(id).unwrap());
        assert_eq!(store.load_tournament(id).unwrap().status, TournamentStatus::Completed);
    }

    #[test]
    fn update_match_is_compare_and_set() {
        let (store, id, _, _) = seeded();
        let m = store.load_match(id, 0).unwrap();
        let started = Match {
            state: MatchState::InProgress,
            ..m.clone()
        };
        store.update_match(id, &m, started.clone()).unwrap();
        assert_eq!(
            store.update_match(id, &m, started),
            Err(TournamentError::Conflict)
        );
    }
}
