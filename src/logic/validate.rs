//! Match-count oracle for generated brackets.

use crate::models::{BracketType, EliminationType, GameMatch, MatchKey, MAX_TEAMS, MIN_TEAMS};
use serde::Serialize;
use std::collections::HashSet;

/// Matches per bracket type.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MatchCounts {
    pub winner: usize,
    pub loser: usize,
    pub championship: usize,
}

impl MatchCounts {
    pub const fn new(winner: usize, loser: usize, championship: usize) -> Self {
        Self {
            winner,
            loser,
            championship,
        }
    }

    pub fn of(matches: &[GameMatch]) -> Self {
        matches.iter().fold(Self::default(), |mut c, m| {
            match m.bracket_type() {
                BracketType::Winner => c.winner += 1,
                BracketType::Loser => c.loser += 1,
                BracketType::Championship => c.championship += 1,
            }
            c
        })
    }

    pub fn total(&self) -> usize {
        self.winner + self.loser + self.championship
    }
}

/// Fixed double-elimination expectations, byes included.
const DOUBLE_ELIMINATION_COUNTS: [(usize, MatchCounts); 7] = [
    (3, MatchCounts::new(3, 1, 2)),
    (4, MatchCounts::new(3, 2, 2)),
    (5, MatchCounts::new(4, 3, 2)),
    (6, MatchCounts::new(5, 4, 2)),
    (7, MatchCounts::new(6, 4, 2)),
    (8, MatchCounts::new(7, 6, 2)),
    (16, MatchCounts::new(15, 14, 2)),
];

/// Expected counts for `team_count` teams. Team counts outside the fixed
/// table use the padded power-of-two bracket: P - 1 winners matches and, for
/// double elimination, P - 2 losers matches plus the two championship matches.
pub fn expected_counts(team_count: usize, elimination: EliminationType) -> Option<MatchCounts> {
    if !(MIN_TEAMS..=MAX_TEAMS).contains(&team_count) {
        return None;
    }
    let size = team_count.next_power_of_two();
    let counts = match elimination {
        EliminationType::Single => MatchCounts::new(size - 1, 0, 0),
        EliminationType::Double => DOUBLE_ELIMINATION_COUNTS
            .iter()
            .find(|(n, _)| *n == team_count)
            .map(|(_, c)| *c)
            .unwrap_or(MatchCounts::new(size - 1, size - 2, 2)),
    };
    Some(counts)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    UnsupportedTeamCount(usize),
    CountMismatch {
        expected: MatchCounts,
        actual: MatchCounts,
    },
    DuplicatePosition(MatchKey),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::UnsupportedTeamCount(n) => write!(f, "no expected shape for {} teams", n),
            ValidationError::CountMismatch { expected, actual } => write!(
                f,
                "expected {}/{}/{} winner/loser/championship matches, got {}/{}/{}",
                expected.winner,
                expected.loser,
                expected.championship,
                actual.winner,
                actual.loser,
                actual.championship
            ),
            ValidationError::DuplicatePosition(key) => write!(f, "{} appears twice", key),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check counts per bracket type and that every position is unique.
pub fn check(
    team_count: usize,
    elimination: EliminationType,
    matches: &[GameMatch],
) -> Result<(), ValidationError> {
    let expected = expected_counts(team_count, elimination)
        .ok_or(ValidationError::UnsupportedTeamCount(team_count))?;
    let actual = MatchCounts::of(matches);
    if actual != expected {
        return Err(ValidationError::CountMismatch { expected, actual });
    }
    let mut seen = HashSet::with_capacity(matches.len());
    for m in matches {
        if !seen.insert(m.key()) {
            return Err(ValidationError::DuplicatePosition(m.key()));
        }
    }
    Ok(())
}

/// Diagnostic form of [`check`]: logs the mismatch and reports whether the set is valid.
pub fn validate(team_count: usize, elimination: EliminationType, matches: &[GameMatch]) -> bool {
    match check(team_count, elimination, matches) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Bracket validation failed for {} teams: {}", team_count, e);
            false
        }
    }
}
