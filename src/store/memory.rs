//! In-memory store: every table in one `RwLock`.

use crate::models::{Bracket, BracketId, EliminationType, GameMatch, MatchId, Team, TeamId};
use crate::store::{
    BracketRepository, MatchCriteria, MatchRepository, MatchUpdate, Store, StoreError,
    TeamRepository,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    brackets: HashMap<BracketId, Bracket>,
    teams: HashMap<TeamId, Team>,
    /// Team ids per bracket, in registration order.
    bracket_teams: HashMap<BracketId, Vec<TeamId>>,
    matches: HashMap<MatchId, GameMatch>,
}

/// Rows of one bracket, taken before a transaction.
struct Snapshot {
    bracket: Option<Bracket>,
    matches: Vec<GameMatch>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn snapshot(&self, bracket_id: BracketId) -> Result<Snapshot, StoreError> {
        let t = self.read()?;
        Ok(Snapshot {
            bracket: t.brackets.get(&bracket_id).cloned(),
            matches: t
                .matches
                .values()
                .filter(|m| m.bracket_id == bracket_id)
                .cloned()
                .collect(),
        })
    }

    fn restore(&self, bracket_id: BracketId, snapshot: Snapshot) -> Result<(), StoreError> {
        let mut t = self.write()?;
        t.matches.retain(|_, m| m.bracket_id != bracket_id);
        t.matches
            .extend(snapshot.matches.into_iter().map(|m| (m.id, m)));
        match snapshot.bracket {
            Some(bracket) => t.brackets.insert(bracket_id, bracket),
            None => t.brackets.remove(&bracket_id),
        };
        Ok(())
    }
}

impl TeamRepository for MemoryStore {
    fn list_by_bracket(&self, bracket_id: BracketId) -> Result<Vec<Team>, StoreError> {
        let t = self.read()?;
        let ids = t.bracket_teams.get(&bracket_id).map(Vec::as_slice).unwrap_or_default();
        Ok(ids.iter().filter_map(|id| t.teams.get(id).cloned()).collect())
    }

    fn insert_for_bracket(&self, bracket_id: BracketId, team: Team) -> Result<Team, StoreError> {
        let mut t = self.write()?;
        if !t.brackets.contains_key(&bracket_id) {
            return Err(StoreError::BracketNotFound(bracket_id));
        }
        t.bracket_teams.entry(bracket_id).or_default().push(team.id);
        t.teams.insert(team.id, team.clone());
        Ok(team)
    }
}

impl MatchRepository for MemoryStore {
    fn bulk_insert(&self, matches: Vec<GameMatch>) -> Result<Vec<GameMatch>, StoreError> {
        let mut t = self.write()?;
        for m in &matches {
            let taken = t
                .matches
                .values()
                .any(|other| other.bracket_id == m.bracket_id && other.key() == m.key());
            if taken {
                return Err(StoreError::DuplicatePosition(m.key()));
            }
        }
        for m in &matches {
            t.matches.insert(m.id, m.clone());
        }
        Ok(matches)
    }

    fn delete_by_bracket(&self, bracket_id: BracketId) -> Result<usize, StoreError> {
        let mut t = self.write()?;
        let before = t.matches.len();
        t.matches.retain(|_, m| m.bracket_id != bracket_id);
        Ok(before - t.matches.len())
    }

    fn find_one(&self, criteria: &MatchCriteria) -> Result<Option<GameMatch>, StoreError> {
        let t = self.read()?;
        let found = match criteria {
            MatchCriteria::Id(id) => t.matches.get(id),
            _ => t.matches.values().find(|m| criteria.matches(m)),
        };
        Ok(found.cloned())
    }

    fn find_all(&self, bracket_id: BracketId) -> Result<Vec<GameMatch>, StoreError> {
        let t = self.read()?;
        let mut matches: Vec<GameMatch> = t
            .matches
            .values()
            .filter(|m| m.bracket_id == bracket_id)
            .cloned()
            .collect();
        matches.sort_by_key(GameMatch::key);
        Ok(matches)
    }

    fn update(&self, id: MatchId, fields: &MatchUpdate) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let m = t.matches.get_mut(&id).ok_or(StoreError::MatchNotFound(id))?;
        fields.apply(m);
        Ok(())
    }
}

impl BracketRepository for MemoryStore {
    fn insert(&self, bracket: Bracket) -> Result<Bracket, StoreError> {
        self.write()?.brackets.insert(bracket.id, bracket.clone());
        Ok(bracket)
    }

    fn get(&self, bracket_id: BracketId) -> Result<Option<Bracket>, StoreError> {
        Ok(self.read()?.brackets.get(&bracket_id).cloned())
    }

    fn set_winner(&self, bracket_id: BracketId, team_id: TeamId) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let bracket = t
            .brackets
            .get_mut(&bracket_id)
            .ok_or(StoreError::BracketNotFound(bracket_id))?;
        bracket.winner_team_id = Some(team_id);
        Ok(())
    }

    fn clear_winner(&self, bracket_id: BracketId) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let bracket = t
            .brackets
            .get_mut(&bracket_id)
            .ok_or(StoreError::BracketNotFound(bracket_id))?;
        bracket.winner_team_id = None;
        Ok(())
    }

    fn get_elimination_type(&self, bracket_id: BracketId) -> Result<Option<EliminationType>, StoreError> {
        Ok(self.read()?.brackets.get(&bracket_id).map(|b| b.elimination_type))
    }
}

impl Store for MemoryStore {
    fn transaction<T, E, F>(&self, bracket_id: BracketId, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<StoreError>,
    {
        let snapshot = self.snapshot(bracket_id)?;
        let result = f();
        if result.is_err() {
            if let Err(e) = self.restore(bracket_id, snapshot) {
                log::error!("Could not roll back bracket {}: {}", bracket_id, e);
            } else {
                log::warn!("Rolled back bracket {}", bracket_id);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchKey, Sport};

    #[test]
    fn failed_transaction_restores_bracket_rows() {
        let store = MemoryStore::new();
        let bracket = store
            .insert(Bracket::new("Cup", Sport::Volleyball, EliminationType::Single))
            .unwrap();
        let kept = GameMatch::new(bracket.id, MatchKey::winners(1, 0));
        store.bulk_insert(vec![kept.clone()]).unwrap();
        store.set_winner(bracket.id, TeamId::new_v4()).unwrap();

        let result: Result<(), StoreError> = store.transaction(bracket.id, || {
            store.delete_by_bracket(bracket.id)?;
            store.clear_winner(bracket.id)?;
            Err(StoreError::Backend("disk full".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.find_all(bracket.id).unwrap(), vec![kept]);
        assert!(store.get(bracket.id).unwrap().unwrap().winner_team_id.is_some());
    }

    #[test]
    fn finds_a_match_by_position() {
        let store = MemoryStore::new();
        let (bracket_id, other_id) = (BracketId::new_v4(), BracketId::new_v4());
        let final_match = GameMatch::new(bracket_id, MatchKey::grand_final());
        store
            .bulk_insert(vec![
                GameMatch::new(bracket_id, MatchKey::winners(1, 0)),
                final_match.clone(),
                GameMatch::new(other_id, MatchKey::grand_final()),
            ])
            .unwrap();

        let found = store
            .find_one(&MatchCriteria::Position {
                bracket_id,
                key: MatchKey::grand_final(),
            })
            .unwrap();
        assert_eq!(found, Some(final_match));
        let missing = store
            .find_one(&MatchCriteria::Position {
                bracket_id,
                key: MatchKey::bracket_reset(),
            })
            .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn bulk_insert_rejects_taken_positions() {
        let store = MemoryStore::new();
        let bracket_id = BracketId::new_v4();
        store
            .bulk_insert(vec![GameMatch::new(bracket_id, MatchKey::grand_final())])
            .unwrap();
        assert!(matches!(
            store.bulk_insert(vec![GameMatch::new(bracket_id, MatchKey::grand_final())]),
            Err(StoreError::DuplicatePosition(_))
        ));
    }
}
