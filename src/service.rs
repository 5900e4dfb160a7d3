//! Bracket service: the operations the web layer calls.
//!
//! Every write to one bracket's matches runs under that bracket's lock and
//! inside one store transaction, so concurrent completions never race on a
//! slot and a failed operation leaves no partial writes.

use crate::logic::{self, CompletionOutcome, MatchGraph};
use crate::models::{
    check_team_count, Bracket, BracketError, BracketId, EliminationType, GameMatch, MatchId,
    Scores, Sport, Team, TeamId,
};
use crate::store::{MatchCriteria, MatchUpdate, Store, StoreError};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Result of generating a bracket.
#[derive(Clone, Debug, Serialize)]
pub struct GeneratedBracket {
    pub bracket_id: BracketId,
    pub elimination_type: EliminationType,
    pub team_count: usize,
    pub matches: Vec<GameMatch>,
}

/// A bracket with its teams and matches, for display.
#[derive(Clone, Debug, Serialize)]
pub struct BracketView {
    pub bracket: Bracket,
    pub teams: Vec<Team>,
    /// Sorted by phase, then round, then match order.
    pub matches: Vec<GameMatch>,
}

pub struct BracketService<S> {
    store: S,
    locks: Mutex<HashMap<BracketId, Arc<Mutex<()>>>>,
}

impl<S: Store> BracketService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The write lock of one bracket. Only stored brackets get one.
    fn bracket_lock(&self, bracket_id: BracketId) -> Result<Arc<Mutex<()>>, BracketError> {
        if self.store.get(bracket_id)?.is_none() {
            return Err(BracketError::BracketNotFound(bracket_id));
        }
        let mut locks = self.locks.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(locks.entry(bracket_id).or_default().clone())
    }

    /// Run `f` holding the bracket's write lock.
    fn exclusive<T>(
        &self,
        bracket_id: BracketId,
        f: impl FnOnce() -> Result<T, BracketError>,
    ) -> Result<T, BracketError> {
        let lock = self.bracket_lock(bracket_id)?;
        let _guard = lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        f()
    }

    fn bracket(&self, bracket_id: BracketId) -> Result<Bracket, BracketError> {
        self.store
            .get(bracket_id)?
            .ok_or(BracketError::BracketNotFound(bracket_id))
    }

    pub fn create_bracket(
        &self,
        name: impl Into<String>,
        sport: Sport,
        elimination_type: EliminationType,
    ) -> Result<Bracket, BracketError> {
        let bracket = self.store.insert(Bracket::new(name, sport, elimination_type))?;
        log::info!(
            "Created {:?} elimination bracket {} ({})",
            bracket.elimination_type,
            bracket.id,
            bracket.name
        );
        Ok(bracket)
    }

    /// Add a team to the bracket. Names are unique per bracket (case-insensitive).
    ///
    /// Registering into an already generated bracket discards the stale match
    /// set; once a match has been contested the team list is frozen.
    pub fn register_team(&self, bracket_id: BracketId, name: &str) -> Result<Team, BracketError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BracketError::EmptyTeamName);
        }
        self.exclusive(bracket_id, || {
            let bracket = self.bracket(bracket_id)?;
            let teams = self.store.list_by_bracket(bracket_id)?;
            if teams.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
                return Err(BracketError::DuplicateTeamName);
            }
            let matches = self.store.find_all(bracket_id)?;
            if matches.iter().any(GameMatch::is_contested) {
                return Err(BracketError::TournamentInProgress(bracket_id));
            }
            self.store.transaction(bracket_id, || {
                if !matches.is_empty() {
                    let removed = self.store.delete_by_bracket(bracket_id)?;
                    log::info!("Discarded {} generated matches of bracket {}", removed, bracket_id);
                }
                let team = self
                    .store
                    .insert_for_bracket(bracket_id, Team::new(name, bracket.sport))?;
                Ok(team)
            })
        })
    }

    /// Generate (or regenerate) the bracket with a fresh shuffle.
    pub fn generate_bracket(&self, bracket_id: BracketId) -> Result<GeneratedBracket, BracketError> {
        self.generate_bracket_with_rng(bracket_id, &mut rand::thread_rng())
    }

    /// [`generate_bracket`](Self::generate_bracket) with a caller-supplied seeding RNG.
    pub fn generate_bracket_with_rng<R: Rng + ?Sized>(
        &self,
        bracket_id: BracketId,
        rng: &mut R,
    ) -> Result<GeneratedBracket, BracketError> {
        self.exclusive(bracket_id, || {
            let elimination_type = self
                .store
                .get_elimination_type(bracket_id)?
                .ok_or(BracketError::BracketNotFound(bracket_id))?;
            let team_ids: Vec<TeamId> = self
                .store
                .list_by_bracket(bracket_id)?
                .iter()
                .map(|t| t.id)
                .collect();
            check_team_count(team_ids.len())?;

            let graph = logic::generate_matches(bracket_id, elimination_type, &team_ids, rng)?;
            let matches = self.store.transaction(bracket_id, || {
                self.store.delete_by_bracket(bracket_id)?;
                self.store.clear_winner(bracket_id)?;
                let inserted = self.store.bulk_insert(graph.into_matches())?;
                Ok::<_, BracketError>(inserted)
            })?;

            log::info!(
                "Generated {:?} elimination bracket {} for {} teams ({} matches)",
                elimination_type,
                bracket_id,
                team_ids.len(),
                matches.len()
            );
            Ok(GeneratedBracket {
                bracket_id,
                elimination_type,
                team_count: team_ids.len(),
                matches,
            })
        })
    }

    /// Record a result and advance both teams. Atomic per call.
    ///
    /// A winner that is not registered in the bracket is `TeamNotFound`.
    pub fn complete_match(
        &self,
        match_id: MatchId,
        winner_id: TeamId,
        scores: Option<Scores>,
    ) -> Result<CompletionOutcome, BracketError> {
        let bracket_id = self
            .store
            .find_one(&MatchCriteria::Id(match_id))?
            .ok_or(BracketError::MatchNotFound(match_id))?
            .bracket_id;

        let result = self.exclusive(bracket_id, || {
            let bracket = self.bracket(bracket_id)?;
            let teams = self.store.list_by_bracket(bracket_id)?;
            if !teams.iter().any(|t| t.id == winner_id) {
                return Err(BracketError::TeamNotFound(winner_id));
            }
            let structure = logic::plan_structure(teams.len(), bracket.elimination_type)?;
            let before: HashMap<MatchId, GameMatch> = self
                .store
                .find_all(bracket_id)?
                .into_iter()
                .map(|m| (m.id, m))
                .collect();

            let mut graph = MatchGraph::new(structure, before.values().cloned().collect())?;
            let outcome = logic::complete_match(&mut graph, match_id, winner_id, scores)?;

            self.store.transaction(bracket_id, || {
                for after in graph.changed() {
                    let prior = before
                        .get(&after.id)
                        .ok_or(BracketError::MatchNotFound(after.id))?;
                    let update = MatchUpdate::diff(prior, after);
                    if !update.is_empty() {
                        self.store.update(after.id, &update)?;
                    }
                }
                if let Some(champion) = outcome.champion {
                    self.store.set_winner(bracket_id, champion)?;
                }
                Ok::<_, BracketError>(())
            })?;
            Ok(outcome)
        });

        match &result {
            Ok(outcome) if outcome.tournament_complete => {
                log::info!("Bracket {} complete; champion {}", bracket_id, winner_id)
            }
            Ok(outcome) => log::debug!(
                "Match {} completed; winner {:?}, loser {:?}",
                match_id,
                outcome.winner_advanced,
                outcome.loser_advanced
            ),
            Err(e) => log::warn!("Completing match {} rejected: {}", match_id, e),
        }
        result
    }

    pub fn bracket_view(&self, bracket_id: BracketId) -> Result<BracketView, BracketError> {
        Ok(BracketView {
            bracket: self.bracket(bracket_id)?,
            teams: self.store.list_by_bracket(bracket_id)?,
            matches: self.store.find_all(bracket_id)?,
        })
    }

    pub fn matches(&self, bracket_id: BracketId) -> Result<Vec<GameMatch>, BracketError> {
        self.bracket(bracket_id)?;
        Ok(self.store.find_all(bracket_id)?)
    }

    /// Matches that can be played right now.
    pub fn ready_matches(&self, bracket_id: BracketId) -> Result<Vec<GameMatch>, BracketError> {
        let mut matches = self.matches(bracket_id)?;
        matches.retain(GameMatch::is_ready);
        Ok(matches)
    }
}
