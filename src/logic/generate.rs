//! Bracket generation: shuffle, plan, materialize matches, resolve byes.

use crate::logic::graph::MatchGraph;
use crate::logic::structure::{plan_structure, SlotSource, Structure};
use crate::logic::validate;
use crate::models::{
    check_team_count, BracketError, BracketId, EliminationType, GameMatch, MatchStatus, Phase,
    Slot, TeamId,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Uniform random permutation of the seeding order (Fisher–Yates).
pub fn shuffle_teams<T, R: Rng + ?Sized>(teams: &mut [T], rng: &mut R) {
    teams.shuffle(rng);
}

/// One match per planned position; round-1 slots take their seed, the reset
/// match starts hidden, everything else starts empty and scheduled.
pub fn build_matches(bracket_id: BracketId, structure: &Structure, seeds: &[TeamId]) -> Vec<GameMatch> {
    structure
        .matches()
        .iter()
        .map(|planned| {
            let mut m = GameMatch::new(bracket_id, planned.key);
            for slot in [Slot::Team1, Slot::Team2] {
                if let SlotSource::Seed(i) = planned.source(slot) {
                    m.set_team(slot, seeds.get(i).copied());
                }
            }
            if planned.key.phase == Phase::BracketReset {
                m.status = MatchStatus::Hidden;
            }
            m
        })
        .collect()
}

/// Generate the full match graph for `teams`.
///
/// Byes are resolved before returning: a lone round-1 team is already the
/// winner of its match and sits in the next round, and losers-bracket matches
/// that can only ever see one team are settled as they fill. A graph that fails
/// validation is an error.
pub fn generate_matches<R: Rng + ?Sized>(
    bracket_id: BracketId,
    elimination: EliminationType,
    teams: &[TeamId],
    rng: &mut R,
) -> Result<MatchGraph, BracketError> {
    check_team_count(teams.len())?;
    let structure = plan_structure(teams.len(), elimination)?;

    let mut seeds = teams.to_vec();
    shuffle_teams(&mut seeds, rng);

    let matches = build_matches(bracket_id, &structure, &seeds);
    let mut graph = MatchGraph::new(structure, matches)?;
    graph.settle()?;

    if let Err(e) = validate::check(teams.len(), elimination, graph.matches()) {
        log::error!("Generated bracket {} failed validation: {}", bracket_id, e);
        return Err(BracketError::StructureMismatch(e.to_string()));
    }
    Ok(graph)
}
