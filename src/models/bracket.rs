//! Bracket, EliminationType and BracketError.

use crate::models::game::MatchId;
use crate::models::phase::MatchKey;
use crate::models::team::{Sport, TeamId};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a bracket.
pub type BracketId = Uuid;

/// Fewest teams a bracket can be generated for.
pub const MIN_TEAMS: usize = 2;
/// Most teams a bracket can be generated for.
pub const MAX_TEAMS: usize = 32;

/// Errors that can occur during bracket operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketError {
    /// Fewer than 2 teams assigned.
    InsufficientTeams { count: usize },
    /// More than 32 teams assigned.
    TooManyTeams { count: usize },
    BracketNotFound(BracketId),
    MatchNotFound(MatchId),
    TeamNotFound(TeamId),
    /// Match is hidden, a bye, or still waiting for a team.
    MatchNotReady(MatchId),
    MatchAlreadyCompleted(MatchId),
    /// The reported winner does not play in the match.
    InvalidWinner { match_id: MatchId, team_id: TeamId },
    /// Reported scores give the match to the other team.
    InvalidScores(MatchId),
    /// Team names cannot be blank.
    EmptyTeamName,
    /// A team with this name is already in the bracket (case-insensitive).
    DuplicateTeamName,
    /// Teams cannot change once a match has been played.
    TournamentInProgress(BracketId),
    /// The slot a team should advance into does not exist or is already full.
    AdvancementTargetMissing { from: MatchKey, target: Option<MatchKey> },
    /// Generated matches do not match the expected bracket shape.
    StructureMismatch(String),
    Storage(StoreError),
}

impl std::fmt::Display for BracketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BracketError::InsufficientTeams { count } => {
                write!(f, "Need at least {} teams to generate a bracket (have {})", MIN_TEAMS, count)
            }
            BracketError::TooManyTeams { count } => {
                write!(f, "At most {} teams are supported (have {})", MAX_TEAMS, count)
            }
            BracketError::BracketNotFound(_) => write!(f, "Bracket not found"),
            BracketError::MatchNotFound(_) => write!(f, "Match not found"),
            BracketError::TeamNotFound(_) => write!(f, "Team not found"),
            BracketError::MatchNotReady(_) => write!(f, "Match is not ready to be played"),
            BracketError::MatchAlreadyCompleted(_) => write!(f, "Match is already completed"),
            BracketError::InvalidWinner { .. } => write!(f, "Winner does not play in this match"),
            BracketError::InvalidScores(_) => write!(f, "Scores contradict the reported winner"),
            BracketError::EmptyTeamName => write!(f, "Team name cannot be empty"),
            BracketError::DuplicateTeamName => write!(f, "A team with this name already exists"),
            BracketError::TournamentInProgress(_) => {
                write!(f, "Teams cannot change once matches have been played")
            }
            BracketError::AdvancementTargetMissing { from, target } => match target {
                Some(target) => write!(f, "No open slot in {} for the team leaving {}", target, from),
                None => write!(f, "No match to advance into from {}", from),
            },
            BracketError::StructureMismatch(detail) => {
                write!(f, "Generated bracket has the wrong shape: {}", detail)
            }
            BracketError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for BracketError {}

impl From<StoreError> for BracketError {
    fn from(e: StoreError) -> Self {
        BracketError::Storage(e)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationType {
    Single,
    #[default]
    Double,
}

/// A bracket: its format and, once decided, its champion.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    pub name: String,
    pub sport: Sport,
    pub elimination_type: EliminationType,
    /// Set when the final (or reset) match completes.
    pub winner_team_id: Option<TeamId>,
    pub created_at: DateTime<Utc>,
}

impl Bracket {
    /// Create a new bracket with no teams and no champion.
    pub fn new(name: impl Into<String>, sport: Sport, elimination_type: EliminationType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sport,
            elimination_type,
            winner_team_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.winner_team_id.is_some()
    }
}

/// Check the generation team-count bounds.
pub fn check_team_count(count: usize) -> Result<(), BracketError> {
    if count < MIN_TEAMS {
        return Err(BracketError::InsufficientTeams { count });
    }
    if count > MAX_TEAMS {
        return Err(BracketError::TooManyTeams { count });
    }
    Ok(())
}
