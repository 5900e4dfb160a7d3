//! Storage seams for brackets, teams and matches.
//!
//! The engine only talks to these traits. [`MemoryStore`] backs the web binary
//! and the tests.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    Bracket, BracketId, EliminationType, GameMatch, MatchId, MatchKey, MatchStatus, Team, TeamId,
};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    LockPoisoned,
    BracketNotFound(BracketId),
    MatchNotFound(MatchId),
    /// Another match already holds this position in the bracket.
    DuplicatePosition(MatchKey),
    /// Backend failure.
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::LockPoisoned => write!(f, "lock error"),
            StoreError::BracketNotFound(id) => write!(f, "bracket {} not stored", id),
            StoreError::MatchNotFound(id) => write!(f, "match {} not stored", id),
            StoreError::DuplicatePosition(key) => write!(f, "{} already stored", key),
            StoreError::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// How to look a single match up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchCriteria {
    Id(MatchId),
    Position { bracket_id: BracketId, key: MatchKey },
}

impl MatchCriteria {
    pub fn matches(&self, m: &GameMatch) -> bool {
        match self {
            MatchCriteria::Id(id) => m.id == *id,
            MatchCriteria::Position { bracket_id, key } => m.bracket_id == *bracket_id && m.key() == *key,
        }
    }
}

/// Field-level update of a match. `None` leaves the field as it is.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchUpdate {
    pub team1_id: Option<Option<TeamId>>,
    pub team2_id: Option<Option<TeamId>>,
    pub winner_id: Option<Option<TeamId>>,
    pub status: Option<MatchStatus>,
    pub score_team1: Option<Option<u32>>,
    pub score_team2: Option<Option<u32>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

fn changed<T: PartialEq + Copy>(before: T, after: T) -> Option<T> {
    (before != after).then_some(after)
}

impl MatchUpdate {
    /// Fields that differ between two versions of the same match.
    pub fn diff(before: &GameMatch, after: &GameMatch) -> Self {
        Self {
            team1_id: changed(before.team1_id, after.team1_id),
            team2_id: changed(before.team2_id, after.team2_id),
            winner_id: changed(before.winner_id, after.winner_id),
            status: changed(before.status, after.status),
            score_team1: changed(before.score_team1, after.score_team1),
            score_team2: changed(before.score_team2, after.score_team2),
            completed_at: changed(before.completed_at, after.completed_at),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, m: &mut GameMatch) {
        if let Some(v) = self.team1_id {
            m.team1_id = v;
        }
        if let Some(v) = self.team2_id {
            m.team2_id = v;
        }
        if let Some(v) = self.winner_id {
            m.winner_id = v;
        }
        if let Some(v) = self.status {
            m.status = v;
        }
        if let Some(v) = self.score_team1 {
            m.score_team1 = v;
        }
        if let Some(v) = self.score_team2 {
            m.score_team2 = v;
        }
        if let Some(v) = self.completed_at {
            m.completed_at = v;
        }
    }
}

pub trait TeamRepository {
    /// Teams assigned to the bracket, in registration order.
    fn list_by_bracket(&self, bracket_id: BracketId) -> Result<Vec<Team>, StoreError>;
    fn insert_for_bracket(&self, bracket_id: BracketId, team: Team) -> Result<Team, StoreError>;
}

pub trait MatchRepository {
    fn bulk_insert(&self, matches: Vec<GameMatch>) -> Result<Vec<GameMatch>, StoreError>;
    /// Returns the number of matches removed.
    fn delete_by_bracket(&self, bracket_id: BracketId) -> Result<usize, StoreError>;
    fn find_one(&self, criteria: &MatchCriteria) -> Result<Option<GameMatch>, StoreError>;
    /// All matches of the bracket in progression order.
    fn find_all(&self, bracket_id: BracketId) -> Result<Vec<GameMatch>, StoreError>;
    fn update(&self, id: MatchId, fields: &MatchUpdate) -> Result<(), StoreError>;
}

pub trait BracketRepository {
    fn insert(&self, bracket: Bracket) -> Result<Bracket, StoreError>;
    fn get(&self, bracket_id: BracketId) -> Result<Option<Bracket>, StoreError>;
    fn set_winner(&self, bracket_id: BracketId, team_id: TeamId) -> Result<(), StoreError>;
    fn clear_winner(&self, bracket_id: BracketId) -> Result<(), StoreError>;
    fn get_elimination_type(&self, bracket_id: BracketId) -> Result<Option<EliminationType>, StoreError>;
}

pub trait Store: TeamRepository + MatchRepository + BracketRepository {
    /// Run `f` so that either all of its writes to `bracket_id` land or none do.
    ///
    /// This is not a lock: writers of the same bracket must already be serialized.
    fn transaction<T, E, F>(&self, bracket_id: BracketId, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn diff_then_apply_reproduces_the_change() {
        let before = GameMatch::new(Uuid::new_v4(), MatchKey::winners(2, 0));
        let mut after = before.clone();
        after.team2_id = Some(Uuid::new_v4());
        after.status = MatchStatus::Completed;

        let update = MatchUpdate::diff(&before, &after);
        assert_eq!(update.team1_id, None);
        assert_eq!(update.team2_id, Some(after.team2_id));
        assert!(!update.is_empty());

        let mut applied = before.clone();
        update.apply(&mut applied);
        assert_eq!(applied, after);
        assert!(MatchUpdate::diff(&after, &applied).is_empty());
    }
}
