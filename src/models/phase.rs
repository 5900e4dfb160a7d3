//! Bracket phases and the `round_number` encoding used on the wire.
//!
//! `1..=99` are winners-bracket rounds, `101..=199` losers-bracket rounds
//! (offset by 100), `200` is the grand final and `201` the bracket reset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset added to a losers-bracket round to get its `round_number`.
pub const LOSERS_ROUND_OFFSET: u32 = 100;
/// `round_number` of the grand final.
pub const GRAND_FINAL_ROUND: u32 = 200;
/// `round_number` of the bracket-reset match.
pub const BRACKET_RESET_ROUND: u32 = 201;

/// Which ladder a match belongs to. Orthogonal tag stored next to `round_number`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    Winner,
    Loser,
    Championship,
}

/// Phase and ordinal round of a match.
///
/// Variant order is also progression order: every slot source of a match lives
/// in a strictly earlier phase or round.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Winners-bracket round, 1-based.
    Winners(u32),
    /// Losers-bracket round, 1-based (round 1 is `round_number` 101).
    Losers(u32),
    GrandFinal,
    BracketReset,
}

impl Phase {
    pub fn round_number(self) -> u32 {
        match self {
            Phase::Winners(r) => r,
            Phase::Losers(r) => LOSERS_ROUND_OFFSET + r,
            Phase::GrandFinal => GRAND_FINAL_ROUND,
            Phase::BracketReset => BRACKET_RESET_ROUND,
        }
    }

    pub fn from_round_number(round_number: u32) -> Result<Self, PhaseError> {
        match round_number {
            1..=99 => Ok(Phase::Winners(round_number)),
            101..=199 => Ok(Phase::Losers(round_number - LOSERS_ROUND_OFFSET)),
            GRAND_FINAL_ROUND => Ok(Phase::GrandFinal),
            BRACKET_RESET_ROUND => Ok(Phase::BracketReset),
            _ => Err(PhaseError::InvalidRoundNumber(round_number)),
        }
    }

    /// Decode a stored `(round_number, bracket_type)` pair, rejecting pairs that disagree.
    pub fn from_stored(round_number: u32, bracket_type: BracketType) -> Result<Self, PhaseError> {
        let phase = Self::from_round_number(round_number)?;
        if phase.bracket_type() != bracket_type {
            return Err(PhaseError::BracketTypeMismatch {
                round_number,
                bracket_type,
            });
        }
        Ok(phase)
    }

    pub fn bracket_type(self) -> BracketType {
        match self {
            Phase::Winners(_) => BracketType::Winner,
            Phase::Losers(_) => BracketType::Loser,
            Phase::GrandFinal | Phase::BracketReset => BracketType::Championship,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Winners(r) => write!(f, "winners round {}", r),
            Phase::Losers(r) => write!(f, "losers round {}", r),
            Phase::GrandFinal => write!(f, "grand final"),
            Phase::BracketReset => write!(f, "bracket reset"),
        }
    }
}

/// A stored `round_number` / `bracket_type` that does not describe a phase.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PhaseError {
    InvalidRoundNumber(u32),
    BracketTypeMismatch {
        round_number: u32,
        bracket_type: BracketType,
    },
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseError::InvalidRoundNumber(n) => write!(f, "Invalid round number {}", n),
            PhaseError::BracketTypeMismatch {
                round_number,
                bracket_type,
            } => write!(
                f,
                "Round number {} does not belong to the {:?} bracket",
                round_number, bracket_type
            ),
        }
    }
}

impl std::error::Error for PhaseError {}

/// Position of a match in the bracket: the `(bracket_type, round_number, match_order)` triple.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchKey {
    pub phase: Phase,
    pub order: u32,
}

impl MatchKey {
    pub fn new(phase: Phase, order: u32) -> Self {
        Self { phase, order }
    }

    pub fn winners(round: u32, order: u32) -> Self {
        Self::new(Phase::Winners(round), order)
    }

    pub fn losers(round: u32, order: u32) -> Self {
        Self::new(Phase::Losers(round), order)
    }

    pub fn grand_final() -> Self {
        Self::new(Phase::GrandFinal, 0)
    }

    pub fn bracket_reset() -> Self {
        Self::new(Phase::BracketReset, 0)
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} match {}", self.phase, self.order)
    }
}
