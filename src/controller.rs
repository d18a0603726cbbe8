//! Operations the view layer calls: sequences fixture generation and result
//! recording against a `TournamentStore`.

use crate::logic::{apply_result, generate_fixtures, rank_leaderboard, tournament_standings};
use crate::logic::{LeaderboardEntry, StandingRow};
use crate::models::{
    Format, Match, MatchId, MatchState, ParticipantId, Team, Tournament, TournamentError,
    TournamentId, TournamentStatus, UserStats,
};
use crate::store::{ResultCommit, TournamentStore};
use chrono::Utc;

/// Tournament operations over an injected store.
pub struct TournamentController<S> {
    store: S,
}

impl<S: TournamentStore> TournamentController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Generate and persist the fixtures for a tournament from its registered players.
    ///
    /// The tournament moves to `InProgress` together with the fixtures. Fails with
    /// `AlreadyStarted` if fixtures exist (including when another caller generated them
    /// concurrently), `InvalidState` if the tournament is `Completed`, or
    /// `InsufficientPlayers` with fewer than two players.
    pub fn start_tournament(&self, id: TournamentId) -> Result<Vec<Match>, TournamentError> {
        let tournament = self.store.load_tournament(id)?;
        if tournament.has_started() {
            return Err(TournamentError::AlreadyStarted);
        }
        if tournament.status == TournamentStatus::Completed {
            return Err(TournamentError::InvalidState);
        }
        let matches = generate_fixtures(&tournament.players, tournament.format)?;
        self.store.save_matches(id, matches.clone())?;
        Ok(matches)
    }

    /// Record `winner` for a match and update both participants' stats in one commit.
    ///
    /// A `Conflict` from the store is retried once from a fresh read. If the match was
    /// reported in between, the retry fails with `AlreadyReported`; a second conflict
    /// is returned as-is.
    pub fn report_result(
        &self,
        id: TournamentId,
        match_id: MatchId,
        winner: ParticipantId,
    ) -> Result<Match, TournamentError> {
        match self.try_report_result(id, match_id, winner) {
            Err(TournamentError::Conflict) => self.try_report_result(id, match_id, winner),
            other => other,
        }
    }

    fn try_report_result(
        &self,
        id: TournamentId,
        match_id: MatchId,
        winner: ParticipantId,
    ) -> Result<Match, TournamentError> {
        let expected = self.store.load_match(id, match_id)?;
        let prior_stats = self.store.load_stats(&expected.participants)?;

        let mut updated = expected.clone();
        let mut updated_stats = prior_stats.clone();
        apply_result(&mut updated, winner, &mut updated_stats)?;
        updated.reported_at = Some(Utc::now());

        self.store.commit(ResultCommit {
            tournament_id: id,
            expected,
            updated: updated.clone(),
            prior_stats,
            updated_stats,
        })?;
        Ok(updated)
    }

    /// Mark the tournament `Completed` once every match has a result. Returns whether
    /// this call completed it; later calls and unfinished tournaments return `false`.
    pub fn complete_if_finished(&self, id: TournamentId) -> Result<bool, TournamentError> {
        self.store.complete_if_finished(id)
    }

    /// Mark a match as being played. Repeating it is a no-op; a reported match is `InvalidState`.
    pub fn begin_match(&self, id: TournamentId, match_id: MatchId) -> Result<Match, TournamentError> {
        let current = self.store.load_match(id, match_id)?;
        match current.state {
            MatchState::InProgress => Ok(current),
            MatchState::Reported => Err(TournamentError::InvalidState),
            MatchState::NoShow => {
                let started = Match {
                    state: MatchState::InProgress,
                    ..current.clone()
                };
                self.store.update_match(id, &current, started.clone())?;
                Ok(started)
            }
        }
    }

    pub fn create_tournament(
        &self,
        name: &str,
        format: Format,
        created_by: Option<ParticipantId>,
    ) -> Result<Tournament, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        let tournament = Tournament::new(name, format, created_by);
        self.store.insert_tournament(tournament.clone())?;
        Ok(tournament)
    }

    /// Register a participant in an open tournament that has no fixtures yet.
    pub fn join_tournament(
        &self,
        id: TournamentId,
        participant: ParticipantId,
    ) -> Result<Tournament, TournamentError> {
        self.store.add_player(id, participant)
    }

    /// Tournaments oldest first, optionally only those with the given status.
    pub fn list_tournaments(
        &self,
        status: Option<TournamentStatus>,
    ) -> Result<Vec<Tournament>, TournamentError> {
        let mut all = self.store.list_tournaments()?;
        if let Some(status) = status {
            all.retain(|t| t.status == status);
        }
        Ok(all)
    }

    pub fn set_status(
        &self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<(), TournamentError> {
        self.store.set_status(id, status)
    }

    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.store.load_tournament(id)
    }

    pub fn match_(&self, id: TournamentId, match_id: MatchId) -> Result<Match, TournamentError> {
        self.store.load_match(id, match_id)
    }

    /// A participant's stats; anyone who never played reads as 0/0.
    pub fn stats(&self, participant: ParticipantId) -> Result<UserStats, TournamentError> {
        let stats = self.store.load_stats(&[participant])?;
        Ok(stats.get(&participant).copied().unwrap_or_default())
    }

    pub fn tournament_standings(&self, id: TournamentId) -> Result<Vec<StandingRow>, TournamentError> {
        Ok(tournament_standings(&self.store.load_tournament(id)?))
    }

    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, TournamentError> {
        Ok(rank_leaderboard(&self.store.all_stats()?))
    }

    /// Reported matches the participant played, most recently reported first.
    /// Equal timestamps fall back to the later fixture first.
    pub fn match_history(
        &self,
        participant: ParticipantId,
    ) -> Result<Vec<(TournamentId, Match)>, TournamentError> {
        let mut history: Vec<(TournamentId, Match)> = self
            .store
            .list_tournaments()?
            .into_iter()
            .flat_map(|t| {
                let id = t.id;
                t.matches.into_iter().map(move |m| (id, m))
            })
            .filter(|(_, m)| m.is_reported() && m.involves(participant))
            .collect();
        history.reverse();
        history.sort_by(|(_, a), (_, b)| b.reported_at.cmp(&a.reported_at));
        Ok(history)
    }

    pub fn create_team(&self, name: &str, creator: ParticipantId) -> Result<Team, TournamentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        let team = Team::new(name, creator);
        self.store.insert_team(team.clone())?;
        Ok(team)
    }

    pub fn teams(&self) -> Result<Vec<Team>, TournamentError> {
        self.store.list_teams()
    }
}
