//! Integration tests for structure planning and the match-count table.

use bracket_engine::{
    expected_counts, loser_target_match_order, loser_target_round, plan_structure, BracketError,
    EliminationType, MatchCounts, MatchKey, Phase,
};

#[test]
fn double_elimination_table_counts() {
    let table = [
        (3, (3, 1, 2)),
        (4, (3, 2, 2)),
        (5, (4, 3, 2)),
        (6, (5, 4, 2)),
        (7, (6, 4, 2)),
        (8, (7, 6, 2)),
        (16, (15, 14, 2)),
    ];
    for (teams, (w, l, c)) in table {
        let structure = plan_structure(teams, EliminationType::Double).unwrap();
        assert_eq!(structure.match_counts(), (w, l, c), "{} teams", teams);
        assert_eq!(
            expected_counts(teams, EliminationType::Double),
            Some(MatchCounts::new(w, l, c))
        );
    }
}

#[test]
fn sixteen_teams_total_thirty_one() {
    let counts = expected_counts(16, EliminationType::Double).unwrap();
    assert_eq!(counts.total(), 31);
}

#[test]
fn six_teams_have_four_single_match_loser_rounds() {
    let structure = plan_structure(6, EliminationType::Double).unwrap();
    let rounds: Vec<(u32, usize)> = structure
        .loser_bracket_rounds
        .iter()
        .map(|r| (r.round, r.match_count))
        .collect();
    assert_eq!(rounds, vec![(101, 1), (102, 1), (103, 1), (104, 1)]);
}

#[test]
fn three_teams_have_one_loser_match() {
    let structure = plan_structure(3, EliminationType::Double).unwrap();
    assert_eq!(structure.loser_bracket_rounds.len(), 1);
    assert_eq!(structure.loser_bracket_rounds[0].round, 101);
    assert_eq!(structure.total_slots, 4);
}

#[test]
fn eight_team_losers_drop_into_the_standard_rounds() {
    assert_eq!(loser_target_round(8, 1, 0), Some(101));
    assert_eq!(loser_target_round(8, 1, 3), Some(101));
    assert_eq!(loser_target_round(8, 2, 0), Some(102));
    assert_eq!(loser_target_round(8, 3, 0), Some(104));
    assert_eq!(loser_target_match_order(8, 1, 2), Some(1));
    // Drop rounds take losers in reverse order.
    assert_eq!(loser_target_match_order(8, 2, 0), Some(1));
    assert_eq!(loser_target_match_order(8, 2, 1), Some(0));
}

#[test]
fn sixteen_teams_add_a_fourth_drop_round() {
    assert_eq!(loser_target_round(16, 1, 0), Some(101));
    assert_eq!(loser_target_round(16, 2, 0), Some(102));
    assert_eq!(loser_target_round(16, 3, 0), Some(104));
    assert_eq!(loser_target_round(16, 4, 0), Some(106));
}

#[test]
fn seven_teams_eliminate_one_first_round_loser_outright() {
    assert_eq!(loser_target_round(7, 1, 0), Some(101));
    assert_eq!(loser_target_round(7, 1, 1), Some(101));
    assert_eq!(loser_target_round(7, 1, 2), None);
    let structure = plan_structure(7, EliminationType::Double).unwrap();
    assert!(structure.loser_is_eliminated(MatchKey::winners(1, 2)));
    assert!(!structure.loser_is_eliminated(MatchKey::winners(2, 0)));
}

#[test]
fn losers_of_nonexistent_matches_have_no_target() {
    assert_eq!(loser_target_round(4, 5, 0), None);
    assert_eq!(loser_target_round(1, 1, 0), None);
}

#[test]
fn single_elimination_rounds_are_ceil_log2() {
    for teams in 2..=32usize {
        let structure = plan_structure(teams, EliminationType::Single).unwrap();
        let expected_rounds = teams.next_power_of_two().trailing_zeros();
        assert_eq!(structure.winner_round_count, expected_rounds, "{} teams", teams);
        assert!(structure.loser_bracket_rounds.is_empty());
        assert_eq!(structure.match_counts(), (teams.next_power_of_two() - 1, 0, 0));
        assert!(!structure.has_championship());
    }
}

#[test]
fn championship_feeds_from_both_finals() {
    let structure = plan_structure(8, EliminationType::Double).unwrap();
    let (gf, slot) = structure.winner_target(structure.winners_final()).unwrap();
    assert_eq!(gf, MatchKey::grand_final());
    assert_eq!(slot, bracket_engine::Slot::Team1);
    let last_losers = structure.loser_bracket_rounds.last().unwrap().round;
    let losers_final = MatchKey::new(Phase::from_round_number(last_losers).unwrap(), 0);
    assert_eq!(
        structure.winner_target(losers_final),
        Some((MatchKey::grand_final(), bracket_engine::Slot::Team2))
    );
    assert_eq!(structure.winner_target(MatchKey::grand_final()), None);
}

#[test]
fn two_team_double_sends_the_loser_to_the_grand_final() {
    let structure = plan_structure(2, EliminationType::Double).unwrap();
    assert_eq!(structure.match_counts(), (1, 0, 2));
    assert_eq!(
        structure.loser_target(MatchKey::winners(1, 0)),
        Some((MatchKey::grand_final(), bracket_engine::Slot::Team2))
    );
}

#[test]
fn team_count_bounds() {
    assert!(matches!(
        plan_structure(1, EliminationType::Double),
        Err(BracketError::InsufficientTeams { count: 1 })
    ));
    assert!(matches!(
        plan_structure(33, EliminationType::Single),
        Err(BracketError::TooManyTeams { count: 33 })
    ));
    assert_eq!(expected_counts(0, EliminationType::Single), None);
}
