//! Elimination bracket engine: library with models, business logic, storage and service.

pub mod config;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::ServerConfig;
pub use logic::{
    complete_match, expected_counts, generate_matches, loser_target_match_order, loser_target_round,
    plan_structure, validate, Advancement, CompletionOutcome, MatchCounts, MatchGraph, Structure,
};
pub use models::{
    Bracket, BracketError, BracketId, BracketType, EliminationType, GameMatch, MatchId, MatchKey,
    MatchStatus, Phase, Scores, Slot, Sport, Team, TeamId,
};
pub use service::{BracketService, BracketView, GeneratedBracket};
pub use store::{MemoryStore, Store, StoreError};
