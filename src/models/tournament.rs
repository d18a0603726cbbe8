//! Tournament, its format and status, and the error type shared by every operation.

use crate::models::game::{Match, MatchId};
use crate::models::participant::{ParticipantId, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// What a failed lookup was looking for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resource {
    Tournament(TournamentId),
    Match(TournamentId, MatchId),
    Team(TeamId),
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Fewer than two players to generate fixtures from.
    InsufficientPlayers { found: usize },
    /// The same participant appears twice in the player list.
    DuplicateParticipant(ParticipantId),
    /// The reported winner is not playing in the match.
    InvalidWinner(ParticipantId),
    /// The match already has a winner.
    AlreadyReported(MatchId),
    /// Fixtures already exist for this tournament.
    AlreadyStarted,
    NotFound(Resource),
    /// The stored state changed between read and write.
    Conflict,
    /// Operation not allowed in the tournament's or match's current state.
    InvalidState,
    /// A name was empty after trimming.
    EmptyName,
    /// The backing store could not be accessed (e.g. poisoned lock).
    StoreUnavailable,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InsufficientPlayers { found } => {
                write!(f, "Need at least 2 players to generate fixtures (have {})", found)
            }
            TournamentError::DuplicateParticipant(id) => {
                write!(f, "Participant {} is listed more than once", id)
            }
            TournamentError::InvalidWinner(id) => {
                write!(f, "Participant {} is not playing in this match", id)
            }
            TournamentError::AlreadyReported(id) => {
                write!(f, "Match {} already has a result", id)
            }
            TournamentError::AlreadyStarted => write!(f, "Fixtures have already been generated"),
            TournamentError::NotFound(Resource::Tournament(id)) => {
                write!(f, "Tournament {} not found", id)
            }
            TournamentError::NotFound(Resource::Match(tid, mid)) => {
                write!(f, "Match {} not found in tournament {}", mid, tid)
            }
            TournamentError::NotFound(Resource::Team(id)) => write!(f, "Team {} not found", id),
            TournamentError::Conflict => write!(f, "Concurrent update, please retry"),
            TournamentError::InvalidState => write!(f, "Invalid state for this action"),
            TournamentError::EmptyName => write!(f, "Name must not be empty"),
            TournamentError::StoreUnavailable => write!(f, "Storage is unavailable"),
        }
    }
}

impl std::error::Error for TournamentError {}

/// How fixtures are generated.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    SingleElimination,
    RoundRobin,
}

/// Registration/play status. Set by the surrounding application; the core only reads it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting players.
    #[default]
    Open,
    InProgress,
    Completed,
}

/// A tournament: its registered players and, once started, its fixtures.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: Format,
    pub status: TournamentStatus,
    /// Ordered by join time. Fixed once `matches` is non-empty.
    pub players: Vec<ParticipantId>,
    /// Ordered by id; `matches[i].id == i`.
    pub matches: Vec<Match>,
    pub created_by: Option<ParticipantId>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Create an open tournament with no players.
    pub fn new(name: impl Into<String>, format: Format, created_by: Option<ParticipantId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            status: TournamentStatus::Open,
            players: Vec::new(),
            matches: Vec::new(),
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Create a tournament with players already registered. Still has no fixtures.
    pub fn with_players(
        name: impl Into<String>,
        format: Format,
        players: Vec<ParticipantId>,
    ) -> Self {
        Self {
            players,
            ..Self::new(name, format, None)
        }
    }

    pub fn has_started(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn get_match(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Whether every fixture has a result. False before fixtures exist.
    pub fn all_reported(&self) -> bool {
        self.has_started() && self.matches.iter().all(Match::is_reported)
    }

    /// Register a participant. Joining twice is a no-op.
    pub fn add_player(&mut self, participant: ParticipantId) -> Result<(), TournamentError> {
        if self.has_started() {
            return Err(TournamentError::AlreadyStarted);
        }
        if self.status != TournamentStatus::Open {
            return Err(TournamentError::InvalidState);
        }
        if !self.players.contains(&participant) {
            self.players.push(participant);
        }
        Ok(())
    }
}
