//! Structure planning: bracket topology for a team count and elimination type.
//!
//! A [`Structure`] lists every match of the bracket together with where each of
//! its two slots is fed from. Advancement targets are read back from that graph,
//! so the small hand-indexed layouts and the generic power-of-two layout share
//! one routing path.

use crate::logic::layouts::{small_double_layout, SmallLayout, Src};
use crate::models::{
    check_team_count, BracketError, EliminationType, MatchKey, Phase, Slot, LOSERS_ROUND_OFFSET,
};
use serde::Serialize;

/// Where a slot of a planned match gets its team from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    /// Index into the shuffled team list.
    Seed(usize),
    /// Never filled.
    Bye,
    WinnerOf(MatchKey),
    LoserOf(MatchKey),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct PlannedMatch {
    pub key: MatchKey,
    pub sources: [SlotSource; 2],
}

impl PlannedMatch {
    pub fn source(&self, slot: Slot) -> SlotSource {
        match slot {
            Slot::Team1 => self.sources[0],
            Slot::Team2 => self.sources[1],
        }
    }

    fn slot_fed_by(&self, source: SlotSource) -> Option<Slot> {
        if self.sources[0] == source {
            Some(Slot::Team1)
        } else if self.sources[1] == source {
            Some(Slot::Team2)
        } else {
            None
        }
    }
}

/// One losers-bracket round: its `round_number` (101, 102, ...) and size.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct LoserRound {
    pub round: u32,
    pub match_count: usize,
}

/// Planned topology of a bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Structure {
    pub team_count: usize,
    pub elimination: EliminationType,
    pub winner_round_count: u32,
    pub loser_bracket_rounds: Vec<LoserRound>,
    /// Seeded positions in round 1 including byes.
    pub total_slots: usize,
    matches: Vec<PlannedMatch>,
    /// Winners-bracket matches whose loser is out after a single loss.
    eliminated: Vec<MatchKey>,
}

/// Plan the bracket for `team_count` teams.
pub fn plan_structure(
    team_count: usize,
    elimination: EliminationType,
) -> Result<Structure, BracketError> {
    check_team_count(team_count)?;
    let structure = match elimination {
        EliminationType::Single => power_of_two_structure(team_count, elimination),
        EliminationType::Double => match small_double_layout(team_count) {
            Some(layout) => layout_structure(layout),
            None => power_of_two_structure(team_count, elimination),
        },
    };
    Ok(structure)
}

/// `round_number` of the losers-bracket match receiving the loser of
/// winners-bracket (`winner_round`, `winner_order`). None when that loser is
/// eliminated or the match does not exist.
pub fn loser_target_round(team_count: usize, winner_round: u32, winner_order: u32) -> Option<u32> {
    loser_target(team_count, winner_round, winner_order).map(|key| key.phase.round_number())
}

/// `match_order` of the losers-bracket match receiving the loser of
/// winners-bracket (`winner_round`, `winner_order`).
pub fn loser_target_match_order(
    team_count: usize,
    winner_round: u32,
    winner_order: u32,
) -> Option<u32> {
    loser_target(team_count, winner_round, winner_order).map(|key| key.order)
}

fn loser_target(team_count: usize, winner_round: u32, winner_order: u32) -> Option<MatchKey> {
    let structure = plan_structure(team_count, EliminationType::Double).ok()?;
    structure
        .loser_target(MatchKey::winners(winner_round, winner_order))
        .map(|(key, _)| key)
}

impl Structure {
    /// All planned matches, sorted in progression order.
    pub fn matches(&self) -> &[PlannedMatch] {
        &self.matches
    }

    pub fn planned(&self, key: MatchKey) -> Option<&PlannedMatch> {
        self.matches
            .binary_search_by(|m| m.key.cmp(&key))
            .ok()
            .map(|i| &self.matches[i])
    }

    pub fn winners_final(&self) -> MatchKey {
        MatchKey::winners(self.winner_round_count, 0)
    }

    pub fn has_championship(&self) -> bool {
        self.elimination == EliminationType::Double
    }

    /// Slot the winner of `from` moves into. None for the winners final in
    /// single elimination and for championship matches.
    pub fn winner_target(&self, from: MatchKey) -> Option<(MatchKey, Slot)> {
        if matches!(from.phase, Phase::GrandFinal | Phase::BracketReset) {
            return None;
        }
        self.fed_by(SlotSource::WinnerOf(from))
    }

    /// Slot the loser of a winners-bracket match drops into.
    pub fn loser_target(&self, from: MatchKey) -> Option<(MatchKey, Slot)> {
        if self.loser_is_eliminated(from) {
            return None;
        }
        self.fed_by(SlotSource::LoserOf(from))
    }

    /// Whether losing `from` ends the team's tournament.
    pub fn loser_is_eliminated(&self, from: MatchKey) -> bool {
        match (self.elimination, from.phase) {
            (EliminationType::Single, _) => true,
            (_, Phase::Losers(_)) | (_, Phase::BracketReset) => true,
            (_, Phase::GrandFinal) => false,
            (_, Phase::Winners(_)) => self.eliminated.contains(&from),
        }
    }

    fn fed_by(&self, source: SlotSource) -> Option<(MatchKey, Slot)> {
        self.matches
            .iter()
            .filter(|m| !matches!(m.key.phase, Phase::BracketReset))
            .find_map(|m| m.slot_fed_by(source).map(|slot| (m.key, slot)))
    }

    /// Number of planned matches in each phase group: (winner, loser, championship).
    pub fn match_counts(&self) -> (usize, usize, usize) {
        self.matches
            .iter()
            .fold((0, 0, 0), |(w, l, c), m| match m.key.phase {
                Phase::Winners(_) => (w + 1, l, c),
                Phase::Losers(_) => (w, l + 1, c),
                Phase::GrandFinal | Phase::BracketReset => (w, l, c + 1),
            })
    }
}

fn layout_structure(layout: &SmallLayout) -> Structure {
    let mut matches = Vec::new();
    for (r, round) in layout.winners.iter().enumerate() {
        for (o, pair) in round.iter().enumerate() {
            matches.push(PlannedMatch {
                key: MatchKey::winners(r as u32 + 1, o as u32),
                sources: [source_of(pair[0]), source_of(pair[1])],
            });
        }
    }
    for (r, round) in layout.losers.iter().enumerate() {
        for (o, pair) in round.iter().enumerate() {
            matches.push(PlannedMatch {
                key: MatchKey::losers(r as u32 + 1, o as u32),
                sources: [source_of(pair[0]), source_of(pair[1])],
            });
        }
    }
    let winner_round_count = layout.winners.len() as u32;
    push_championship(&mut matches, winner_round_count, layout.losers.len() as u32);

    Structure {
        team_count: layout.teams,
        elimination: EliminationType::Double,
        winner_round_count,
        loser_bracket_rounds: loser_rounds(&matches),
        total_slots: layout.total_slots,
        matches,
        eliminated: layout
            .eliminated
            .iter()
            .map(|&(r, o)| MatchKey::winners(r, o))
            .collect(),
    }
}

fn source_of(src: Src) -> SlotSource {
    match src {
        Src::Seed(i) => SlotSource::Seed(i),
        Src::Bye => SlotSource::Bye,
        Src::W(r, o) => SlotSource::WinnerOf(MatchKey::winners(r, o)),
        Src::L(r, o) => SlotSource::LoserOf(MatchKey::winners(r, o)),
        Src::LW(r, o) => SlotSource::WinnerOf(MatchKey::losers(r, o)),
    }
}

/// Pad to the next power of two. Round 1 seats real pairs first, then one
/// team against a bye per pair, so no pairing is two byes.
fn power_of_two_structure(team_count: usize, elimination: EliminationType) -> Structure {
    let size = team_count.next_power_of_two();
    let rounds = size.trailing_zeros();
    let mut matches = Vec::with_capacity(2 * size);

    let real_pairs = team_count - size / 2;
    let mut seed = 0;
    for o in 0..size / 2 {
        let sources = if o < real_pairs {
            seed += 2;
            [SlotSource::Seed(seed - 2), SlotSource::Seed(seed - 1)]
        } else {
            seed += 1;
            [SlotSource::Seed(seed - 1), SlotSource::Bye]
        };
        matches.push(PlannedMatch {
            key: MatchKey::winners(1, o as u32),
            sources,
        });
    }
    for r in 2..=rounds {
        for o in 0..(size >> r) as u32 {
            matches.push(PlannedMatch {
                key: MatchKey::winners(r, o),
                sources: [
                    SlotSource::WinnerOf(MatchKey::winners(r - 1, 2 * o)),
                    SlotSource::WinnerOf(MatchKey::winners(r - 1, 2 * o + 1)),
                ],
            });
        }
    }

    if elimination == EliminationType::Double {
        let loser_round_count = push_power_of_two_losers(&mut matches, size, rounds);
        push_championship(&mut matches, rounds, loser_round_count);
    }

    Structure {
        team_count,
        elimination,
        winner_round_count: rounds,
        loser_bracket_rounds: loser_rounds(&matches),
        total_slots: size,
        matches,
        eliminated: Vec::new(),
    }
}

/// Standard losers bracket for `size` seeded slots: round 1 pairs the
/// winners round 1 losers, then rounds alternate between taking in the next
/// winners round's losers (in reverse order, against rematches) and halving.
/// Returns the number of losers rounds.
fn push_power_of_two_losers(matches: &mut Vec<PlannedMatch>, size: usize, rounds: u32) -> u32 {
    if rounds < 2 {
        return 0;
    }
    let loser_round_count = 2 * (rounds - 1);
    for j in 1..=loser_round_count {
        if j == 1 {
            for o in 0..(size / 4) as u32 {
                matches.push(PlannedMatch {
                    key: MatchKey::losers(1, o),
                    sources: [
                        SlotSource::LoserOf(MatchKey::winners(1, 2 * o)),
                        SlotSource::LoserOf(MatchKey::winners(1, 2 * o + 1)),
                    ],
                });
            }
        } else if j % 2 == 0 {
            let dropping_round = j / 2 + 1;
            let count = (size >> dropping_round) as u32;
            for o in 0..count {
                matches.push(PlannedMatch {
                    key: MatchKey::losers(j, o),
                    sources: [
                        SlotSource::WinnerOf(MatchKey::losers(j - 1, o)),
                        SlotSource::LoserOf(MatchKey::winners(dropping_round, count - 1 - o)),
                    ],
                });
            }
        } else {
            let count = (size >> ((j - 1) / 2 + 2)) as u32;
            for o in 0..count {
                matches.push(PlannedMatch {
                    key: MatchKey::losers(j, o),
                    sources: [
                        SlotSource::WinnerOf(MatchKey::losers(j - 1, 2 * o)),
                        SlotSource::WinnerOf(MatchKey::losers(j - 1, 2 * o + 1)),
                    ],
                });
            }
        }
    }
    loser_round_count
}

/// Grand final: winners champion in team1, losers champion in team2 (the
/// winners-final loser when there is no losers bracket). The reset match
/// replays the grand final with the same sides.
fn push_championship(matches: &mut Vec<PlannedMatch>, winner_rounds: u32, loser_rounds: u32) {
    let winners_final = MatchKey::winners(winner_rounds, 0);
    let losers_side = if loser_rounds == 0 {
        SlotSource::LoserOf(winners_final)
    } else {
        SlotSource::WinnerOf(MatchKey::losers(loser_rounds, 0))
    };
    matches.push(PlannedMatch {
        key: MatchKey::grand_final(),
        sources: [SlotSource::WinnerOf(winners_final), losers_side],
    });
    matches.push(PlannedMatch {
        key: MatchKey::bracket_reset(),
        sources: [
            SlotSource::LoserOf(MatchKey::grand_final()),
            SlotSource::WinnerOf(MatchKey::grand_final()),
        ],
    });
}

fn loser_rounds(matches: &[PlannedMatch]) -> Vec<LoserRound> {
    let mut rounds: Vec<LoserRound> = Vec::new();
    for m in matches {
        if let Phase::Losers(r) = m.key.phase {
            match rounds.last_mut() {
                Some(last) if last.round == LOSERS_ROUND_OFFSET + r => last.match_count += 1,
                _ => rounds.push(LoserRound {
                    round: LOSERS_ROUND_OFFSET + r,
                    match_count: 1,
                }),
            }
        }
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_table_for_four_teams_agrees_with_power_of_two_layout() {
        let table = layout_structure(small_double_layout(4).unwrap());
        let generic = power_of_two_structure(4, EliminationType::Double);
        assert_eq!(table, generic);
    }

    #[test]
    fn planned_matches_are_sorted_and_unique() {
        for n in 2..=32 {
            for elimination in [EliminationType::Single, EliminationType::Double] {
                let s = plan_structure(n, elimination).unwrap();
                assert!(
                    s.matches().windows(2).all(|w| w[0].key < w[1].key),
                    "{} teams {:?}",
                    n,
                    elimination
                );
            }
        }
    }

    #[test]
    fn every_source_refers_to_an_earlier_match_and_feeds_one_slot() {
        for n in 2..=32 {
            for elimination in [EliminationType::Single, EliminationType::Double] {
                let s = plan_structure(n, elimination).unwrap();
                let mut seen = Vec::new();
                for m in s.matches() {
                    for src in m.sources {
                        if let SlotSource::WinnerOf(k) | SlotSource::LoserOf(k) = src {
                            assert!(k < m.key, "{} teams: {} fed by later {}", n, m.key, k);
                            assert!(s.planned(k).is_some(), "{} teams: {} missing", n, k);
                            assert!(!seen.contains(&src), "{} teams: {:?} used twice", n, src);
                            seen.push(src);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn single_elimination_has_no_losers_or_championship() {
        let s = plan_structure(12, EliminationType::Single).unwrap();
        assert_eq!(s.match_counts(), (15, 0, 0));
        assert!(s.loser_bracket_rounds.is_empty());
        assert!(s.winner_target(s.winners_final()).is_none());
        assert!(s.loser_is_eliminated(MatchKey::winners(1, 0)));
    }

    #[test]
    fn two_team_double_sends_the_loser_to_the_grand_final() {
        let s = plan_structure(2, EliminationType::Double).unwrap();
        assert_eq!(s.match_counts(), (1, 0, 2));
        assert_eq!(
            s.loser_target(MatchKey::winners(1, 0)),
            Some((MatchKey::grand_final(), Slot::Team2))
        );
    }
}
