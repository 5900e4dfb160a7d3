//! Match graph: one bracket's matches indexed by position, plus the planned
//! structure that says where every slot is fed from.

use crate::logic::structure::{SlotSource, Structure};
use crate::models::{
    BracketError, EliminationType, GameMatch, MatchId, MatchKey, MatchStatus, Slot, TeamId,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Where a team went after a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advancement {
    /// Moved into a slot of another match.
    Placed {
        match_id: MatchId,
        round_number: u32,
        match_order: u32,
        slot: Slot,
    },
    Eliminated,
    Champion,
}

impl Advancement {
    pub fn is_placed(&self) -> bool {
        matches!(self, Advancement::Placed { .. })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SlotState {
    Filled(TeamId),
    /// Will be filled once an upstream match completes.
    Pending,
    /// Can never be filled.
    Dead,
}

#[derive(Clone, Debug)]
pub struct MatchGraph {
    structure: Structure,
    matches: Vec<GameMatch>,
    index: HashMap<MatchKey, usize>,
    changed: BTreeSet<usize>,
}

impl MatchGraph {
    /// Index `matches` against `structure`. Every planned position must be
    /// present exactly once and nothing else may be.
    pub fn new(structure: Structure, mut matches: Vec<GameMatch>) -> Result<Self, BracketError> {
        matches.sort_by_key(GameMatch::key);
        let mut index = HashMap::with_capacity(matches.len());
        for (i, m) in matches.iter().enumerate() {
            if index.insert(m.key(), i).is_some() {
                return Err(BracketError::StructureMismatch(format!("duplicate {}", m.key())));
            }
        }
        if matches.len() != structure.matches().len() {
            return Err(BracketError::StructureMismatch(format!(
                "{} matches stored, {} planned for {} teams",
                matches.len(),
                structure.matches().len(),
                structure.team_count
            )));
        }
        if let Some(missing) = structure.matches().iter().find(|p| !index.contains_key(&p.key)) {
            return Err(BracketError::StructureMismatch(format!("missing {}", missing.key)));
        }
        Ok(Self {
            structure,
            matches,
            index,
            changed: BTreeSet::new(),
        })
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// All matches in progression order.
    pub fn matches(&self) -> &[GameMatch] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<GameMatch> {
        self.matches
    }

    pub fn get(&self, key: MatchKey) -> Option<&GameMatch> {
        self.index.get(&key).map(|&i| &self.matches[i])
    }

    pub fn find(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Matches modified since the graph was built.
    pub fn changed(&self) -> impl Iterator<Item = &GameMatch> {
        self.changed.iter().map(|&i| &self.matches[i])
    }

    pub(crate) fn index_of(&self, id: MatchId) -> Option<usize> {
        self.matches.iter().position(|m| m.id == id)
    }

    pub(crate) fn match_mut(&mut self, idx: usize) -> &mut GameMatch {
        self.changed.insert(idx);
        &mut self.matches[idx]
    }

    pub(crate) fn index_of_key(&self, key: MatchKey) -> Option<usize> {
        self.index.get(&key).copied()
    }

    /// Put `team` into the target slot, or the other slot if that one is taken.
    pub(crate) fn place(
        &mut self,
        from: MatchKey,
        team: TeamId,
        (target, preferred): (MatchKey, Slot),
    ) -> Result<Advancement, BracketError> {
        let missing = BracketError::AdvancementTargetMissing {
            from,
            target: Some(target),
        };
        let idx = self.index_of_key(target).ok_or_else(|| missing.clone())?;
        let m = &self.matches[idx];
        if m.status != MatchStatus::Scheduled {
            return Err(missing);
        }
        let slot = if m.team(preferred).is_none() {
            preferred
        } else if m.team(preferred.other()).is_none() {
            preferred.other()
        } else {
            return Err(missing);
        };

        let m = self.match_mut(idx);
        m.set_team(slot, Some(team));
        log::debug!("{} advances from {} into {} ({:?})", team, from, target, slot);
        Ok(Advancement::Placed {
            match_id: m.id,
            round_number: target.phase.round_number(),
            match_order: target.order,
            slot,
        })
    }

    /// Send the winner of `from` on.
    pub(crate) fn route_winner(&mut self, from: MatchKey, team: TeamId) -> Result<Advancement, BracketError> {
        match self.structure.winner_target(from) {
            Some(target) => self.place(from, team, target),
            None if self.structure.elimination == EliminationType::Single
                && from == self.structure.winners_final() =>
            {
                Ok(Advancement::Champion)
            }
            None => Err(BracketError::AdvancementTargetMissing { from, target: None }),
        }
    }

    /// Send the loser of `from` to the losers bracket, or out.
    pub(crate) fn route_loser(&mut self, from: MatchKey, team: TeamId) -> Result<Advancement, BracketError> {
        if self.structure.loser_is_eliminated(from) {
            return Ok(Advancement::Eliminated);
        }
        match self.structure.loser_target(from) {
            Some(target) => self.place(from, team, target),
            None => Err(BracketError::AdvancementTargetMissing { from, target: None }),
        }
    }

    /// Resolve every scheduled match that can no longer be contested: both
    /// slots dead becomes a bye, one team facing a dead slot walks over.
    /// One pass suffices since sources always precede the matches they feed.
    pub(crate) fn settle(&mut self) -> Result<(), BracketError> {
        for idx in 0..self.matches.len() {
            if self.matches[idx].status != MatchStatus::Scheduled {
                continue;
            }
            let key = self.matches[idx].key();
            let lone = match (self.slot_state(key, Slot::Team1), self.slot_state(key, Slot::Team2)) {
                (SlotState::Dead, SlotState::Dead) => {
                    self.match_mut(idx).status = MatchStatus::Bye;
                    log::debug!("{} can never be played; marked bye", key);
                    continue;
                }
                (SlotState::Filled(team), SlotState::Dead) | (SlotState::Dead, SlotState::Filled(team)) => team,
                _ => continue,
            };

            let m = self.match_mut(idx);
            m.winner_id = Some(lone);
            m.status = MatchStatus::Completed;
            m.completed_at = Some(Utc::now());
            log::debug!("{} walks over in {}", lone, key);
            self.route_winner(key, lone)?;
        }
        Ok(())
    }

    fn slot_state(&self, key: MatchKey, slot: Slot) -> SlotState {
        let Some(m) = self.get(key) else {
            return SlotState::Dead;
        };
        if let Some(team) = m.team(slot) {
            return SlotState::Filled(team);
        }
        let Some(planned) = self.structure.planned(key) else {
            return SlotState::Dead;
        };
        let dead = match planned.source(slot) {
            SlotSource::Bye | SlotSource::Seed(_) => true,
            SlotSource::WinnerOf(src) => self.never_has_winner(src),
            SlotSource::LoserOf(src) => self.never_has_loser(src),
        };
        if dead {
            SlotState::Dead
        } else {
            SlotState::Pending
        }
    }

    fn never_has_winner(&self, key: MatchKey) -> bool {
        match self.get(key) {
            None => true,
            Some(m) => match m.status {
                MatchStatus::Bye => true,
                MatchStatus::Completed | MatchStatus::Hidden => false,
                MatchStatus::Scheduled => {
                    self.slot_state(key, Slot::Team1) == SlotState::Dead
                        && self.slot_state(key, Slot::Team2) == SlotState::Dead
                }
            },
        }
    }

    fn never_has_loser(&self, key: MatchKey) -> bool {
        match self.get(key) {
            None => true,
            Some(m) => match m.status {
                MatchStatus::Bye => true,
                MatchStatus::Completed => m.loser_id().is_none(),
                MatchStatus::Hidden => false,
                MatchStatus::Scheduled => {
                    self.slot_state(key, Slot::Team1) == SlotState::Dead
                        || self.slot_state(key, Slot::Team2) == SlotState::Dead
                }
            },
        }
    }
}
