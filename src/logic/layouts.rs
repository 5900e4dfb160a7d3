//! Hand-indexed double-elimination layouts for 3 to 7 teams.
//!
//! These counts do not decompose into the power-of-two layout: 5, 6 and 7 teams
//! play partial rounds instead of padding, and each table fixes where every
//! winners-bracket loser drops. Each row is one round, each entry one match,
//! each pair the (team1, team2) slot sources.

/// Slot source shorthand used by the tables.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Src {
    /// Shuffled team at this index.
    Seed(usize),
    /// Padding; the opponent advances without playing.
    Bye,
    /// Winner of winners-bracket (round, order).
    W(u32, u32),
    /// Loser of winners-bracket (round, order).
    L(u32, u32),
    /// Winner of losers-bracket (round, order).
    LW(u32, u32),
}

pub(crate) struct SmallLayout {
    pub teams: usize,
    pub total_slots: usize,
    pub winners: &'static [&'static [[Src; 2]]],
    pub losers: &'static [&'static [[Src; 2]]],
    /// Winners-bracket matches whose loser has no losers-bracket slot.
    pub eliminated: &'static [(u32, u32)],
}

use Src::*;

static SMALL_DOUBLE_LAYOUTS: [SmallLayout; 5] = [
    SmallLayout {
        teams: 3,
        total_slots: 4,
        winners: &[&[[Seed(0), Seed(1)], [Seed(2), Bye]], &[[W(1, 0), W(1, 1)]]],
        losers: &[&[[L(1, 0), L(2, 0)]]],
        eliminated: &[],
    },
    SmallLayout {
        teams: 4,
        total_slots: 4,
        winners: &[&[[Seed(0), Seed(1)], [Seed(2), Seed(3)]], &[[W(1, 0), W(1, 1)]]],
        losers: &[&[[L(1, 0), L(1, 1)]], &[[LW(1, 0), L(2, 0)]]],
        eliminated: &[],
    },
    SmallLayout {
        teams: 5,
        total_slots: 5,
        winners: &[
            &[[Seed(0), Seed(1)]],
            &[[W(1, 0), Seed(2)], [Seed(3), Seed(4)]],
            &[[W(2, 0), W(2, 1)]],
        ],
        losers: &[
            &[[L(1, 0), L(2, 1)]],
            &[[LW(1, 0), L(2, 0)]],
            &[[LW(2, 0), L(3, 0)]],
        ],
        eliminated: &[],
    },
    SmallLayout {
        teams: 6,
        total_slots: 6,
        winners: &[
            &[[Seed(0), Seed(1)], [Seed(2), Seed(3)]],
            &[[W(1, 0), Seed(4)], [W(1, 1), Seed(5)]],
            &[[W(2, 0), W(2, 1)]],
        ],
        losers: &[
            &[[L(1, 0), L(1, 1)]],
            &[[LW(1, 0), L(2, 1)]],
            &[[LW(2, 0), L(2, 0)]],
            &[[LW(3, 0), L(3, 0)]],
        ],
        eliminated: &[],
    },
    // Four single-match losers rounds seat five of the six winners-bracket
    // losers; the loser of the third opening match is out.
    SmallLayout {
        teams: 7,
        total_slots: 7,
        winners: &[
            &[[Seed(0), Seed(1)], [Seed(2), Seed(3)], [Seed(4), Seed(5)]],
            &[[W(1, 0), W(1, 1)], [W(1, 2), Seed(6)]],
            &[[W(2, 0), W(2, 1)]],
        ],
        losers: &[
            &[[L(1, 0), L(1, 1)]],
            &[[LW(1, 0), L(2, 1)]],
            &[[LW(2, 0), L(2, 0)]],
            &[[LW(3, 0), L(3, 0)]],
        ],
        eliminated: &[(1, 2)],
    },
];

pub(crate) fn small_double_layout(teams: usize) -> Option<&'static SmallLayout> {
    SMALL_DOUBLE_LAYOUTS.iter().find(|l| l.teams == teams)
}
