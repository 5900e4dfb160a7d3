//! Match (game) record, its status, slots and scores.

use crate::models::bracket::BracketId;
use crate::models::phase::{BracketType, MatchKey, Phase, PhaseError};
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// One of the two team positions of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Team1,
    Team2,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Slot::Team1 => Slot::Team2,
            Slot::Team2 => Slot::Team1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Completed,
    /// Reset match before the grand final asks for it.
    Hidden,
    /// Neither slot can ever be filled; nothing advances out of this match.
    Bye,
}

/// Final score of a match, as reported by the scorer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub team1: u32,
    pub team2: u32,
}

/// A single match of a bracket.
///
/// Serialized as a flat record carrying `round_number` and `bracket_type`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(into = "MatchRecord", try_from = "MatchRecord")]
pub struct GameMatch {
    pub id: MatchId,
    pub bracket_id: BracketId,
    pub phase: Phase,
    /// Zero-based position within the phase round.
    pub match_order: u32,
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    /// None until completed. Always one of `team1_id` / `team2_id`.
    pub winner_id: Option<TeamId>,
    pub status: MatchStatus,
    pub score_team1: Option<u32>,
    pub score_team2: Option<u32>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl GameMatch {
    pub fn new(bracket_id: BracketId, key: MatchKey) -> Self {
        Self {
            id: Uuid::new_v4(),
            bracket_id,
            phase: key.phase,
            match_order: key.order,
            team1_id: None,
            team2_id: None,
            winner_id: None,
            status: MatchStatus::Scheduled,
            score_team1: None,
            score_team2: None,
            completed_at: None,
        }
    }

    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.phase, self.match_order)
    }

    pub fn round_number(&self) -> u32 {
        self.phase.round_number()
    }

    pub fn bracket_type(&self) -> BracketType {
        self.phase.bracket_type()
    }

    pub fn team(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::Team1 => self.team1_id,
            Slot::Team2 => self.team2_id,
        }
    }

    pub fn set_team(&mut self, slot: Slot, team: Option<TeamId>) {
        match slot {
            Slot::Team1 => self.team1_id = team,
            Slot::Team2 => self.team2_id = team,
        }
    }

    /// Slot holding `team`, if it plays in this match.
    pub fn slot_of(&self, team: TeamId) -> Option<Slot> {
        if self.team1_id == Some(team) {
            Some(Slot::Team1)
        } else if self.team2_id == Some(team) {
            Some(Slot::Team2)
        } else {
            None
        }
    }

    /// The team that lost a completed match. None for walkovers.
    pub fn loser_id(&self) -> Option<TeamId> {
        let winner = self.winner_id?;
        match self.slot_of(winner)? {
            Slot::Team1 => self.team2_id,
            Slot::Team2 => self.team1_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Never contested: a dead position, or a walkover against an unfillable slot.
    pub fn is_bye(&self) -> bool {
        self.status == MatchStatus::Bye
            || (self.is_completed() && (self.team1_id.is_none() || self.team2_id.is_none()))
    }

    /// Can be played right now: scheduled and both teams known.
    pub fn is_ready(&self) -> bool {
        self.status == MatchStatus::Scheduled && self.team1_id.is_some() && self.team2_id.is_some()
    }

    /// Completed with two teams on the court.
    pub fn is_contested(&self) -> bool {
        self.is_completed() && self.team1_id.is_some() && self.team2_id.is_some()
    }
}

/// Storage/wire shape of a match: the phase flattened into `round_number` + `bracket_type`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub bracket_id: BracketId,
    pub round_number: u32,
    pub bracket_type: BracketType,
    pub match_order: u32,
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub winner_id: Option<TeamId>,
    pub status: MatchStatus,
    pub score_team1: Option<u32>,
    pub score_team2: Option<u32>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<GameMatch> for MatchRecord {
    fn from(m: GameMatch) -> Self {
        Self {
            id: m.id,
            bracket_id: m.bracket_id,
            round_number: m.phase.round_number(),
            bracket_type: m.phase.bracket_type(),
            match_order: m.match_order,
            team1_id: m.team1_id,
            team2_id: m.team2_id,
            winner_id: m.winner_id,
            status: m.status,
            score_team1: m.score_team1,
            score_team2: m.score_team2,
            completed_at: m.completed_at,
        }
    }
}

impl TryFrom<MatchRecord> for GameMatch {
    type Error = PhaseError;

    fn try_from(r: MatchRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            bracket_id: r.bracket_id,
            phase: Phase::from_stored(r.round_number, r.bracket_type)?,
            match_order: r.match_order,
            team1_id: r.team1_id,
            team2_id: r.team2_id,
            winner_id: r.winner_id,
            status: r.status,
            score_team1: r.score_team1,
            score_team2: r.score_team2,
            completed_at: r.completed_at,
        })
    }
}
