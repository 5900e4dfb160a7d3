//! Bracket business logic: planning, generation, progression, validation.

mod generate;
mod graph;
mod layouts;
mod progression;
mod structure;
mod validate;

pub use generate::{build_matches, generate_matches, shuffle_teams};
pub use graph::{Advancement, MatchGraph};
pub use progression::{complete_match, CompletionOutcome};
pub use structure::{
    loser_target_match_order, loser_target_round, plan_structure, LoserRound, PlannedMatch,
    SlotSource, Structure,
};
pub use validate::{check, expected_counts, validate, MatchCounts, ValidationError};
