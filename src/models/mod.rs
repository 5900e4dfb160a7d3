//! Data structures for brackets: teams, matches, phases.

mod bracket;
mod game;
mod phase;
mod team;

pub use bracket::{
    check_team_count, Bracket, BracketError, BracketId, EliminationType, MAX_TEAMS, MIN_TEAMS,
};
pub use game::{GameMatch, MatchId, MatchRecord, MatchStatus, Scores, Slot};
pub use phase::{
    BracketType, MatchKey, Phase, PhaseError, BRACKET_RESET_ROUND, GRAND_FINAL_ROUND,
    LOSERS_ROUND_OFFSET,
};
pub use team::{Sport, Team, TeamId};
