//! Integration tests for bracket generation: counts, byes, seeding.

use bracket_engine::{
    expected_counts, generate_matches, validate, BracketError, BracketId, BracketType, EliminationType,
    GameMatch, MatchCounts, MatchKey, MatchStatus, TeamId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use uuid::Uuid;

fn teams(n: usize) -> Vec<TeamId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

fn generate(n: usize, elimination: EliminationType, seed: u64) -> (Vec<TeamId>, Vec<GameMatch>) {
    let teams = teams(n);
    let mut rng = StdRng::seed_from_u64(seed);
    let graph = generate_matches(Uuid::new_v4(), elimination, &teams, &mut rng).unwrap();
    (teams, graph.into_matches())
}

#[test]
fn counts_match_the_table_for_every_supported_size() {
    for elimination in [EliminationType::Single, EliminationType::Double] {
        for n in 2..=32 {
            let (_, matches) = generate(n, elimination, n as u64);
            assert_eq!(
                Some(MatchCounts::of(&matches)),
                expected_counts(n, elimination),
                "{} teams, {:?}",
                n,
                elimination
            );
            assert!(validate(n, elimination, &matches));
        }
    }
}

#[test]
fn every_team_is_placed() {
    for n in [3, 5, 6, 7, 12, 32] {
        let (teams, matches) = generate(n, EliminationType::Double, 7);
        let placed: HashSet<TeamId> = matches
            .iter()
            .flat_map(|m| [m.team1_id, m.team2_id])
            .flatten()
            .collect();
        assert_eq!(placed, teams.iter().copied().collect::<HashSet<_>>(), "{} teams", n);
    }
}

#[test]
fn first_round_byes_are_completed_with_the_lone_team() {
    let (_, matches) = generate(5, EliminationType::Single, 1);
    let byes: Vec<&GameMatch> = matches.iter().filter(|m| m.is_bye()).collect();
    assert_eq!(byes.len(), 3);
    for bye in byes {
        assert_eq!(bye.status, MatchStatus::Completed);
        assert!(bye.winner_id.is_some());
        assert_eq!(bye.winner_id, bye.team1_id.or(bye.team2_id));
        assert!(bye.completed_at.is_some());
    }
    // The bye winners already sit in round 2.
    let round_two_filled = matches
        .iter()
        .filter(|m| m.key().phase == bracket_engine::Phase::Winners(2))
        .flat_map(|m| [m.team1_id, m.team2_id])
        .flatten()
        .count();
    assert_eq!(round_two_filled, 3);
}

#[test]
fn single_elimination_contests_n_minus_one_matches() {
    for n in 2..=32 {
        let (_, matches) = generate(n, EliminationType::Single, 3);
        let walkovers = matches.iter().filter(|m| m.is_bye()).count();
        assert_eq!(matches.len() - walkovers, n - 1, "{} teams", n);
        assert_eq!(matches.len(), n.next_power_of_two() - 1);
    }
}

#[test]
fn three_team_double_elimination() {
    let (_, matches) = generate(3, EliminationType::Double, 11);
    assert_eq!(matches.len(), 6);
    let losers: Vec<&GameMatch> = matches
        .iter()
        .filter(|m| m.bracket_type() == BracketType::Loser)
        .collect();
    assert_eq!(losers.len(), 1);
    assert_eq!(losers[0].round_number(), 101);

    let ready: Vec<&GameMatch> = matches.iter().filter(|m| m.is_ready()).collect();
    assert_eq!(ready.len(), 1);
    assert_eq!(ready[0].key(), MatchKey::winners(1, 0));
}

#[test]
fn reset_match_starts_hidden() {
    let (_, matches) = generate(8, EliminationType::Double, 5);
    let reset = matches
        .iter()
        .find(|m| m.key() == MatchKey::bracket_reset())
        .unwrap();
    assert_eq!(reset.status, MatchStatus::Hidden);
    assert_eq!(reset.round_number(), 201);
    assert!(!reset.is_ready());
}

#[test]
fn same_seed_same_bracket() {
    let teams = teams(9);
    let bracket_id: BracketId = Uuid::new_v4();
    let seeded = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        generate_matches(bracket_id, EliminationType::Double, &teams, &mut rng)
            .unwrap()
            .into_matches()
            .into_iter()
            .map(|m| (m.key(), m.team1_id, m.team2_id, m.winner_id))
            .collect::<Vec<_>>()
    };
    assert_eq!(seeded(42), seeded(42));
}

#[test]
fn positions_are_unique() {
    let (_, matches) = generate(24, EliminationType::Double, 9);
    let keys: HashSet<MatchKey> = matches.iter().map(GameMatch::key).collect();
    assert_eq!(keys.len(), matches.len());
}

#[test]
fn rejects_out_of_range_team_counts() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        generate_matches(Uuid::new_v4(), EliminationType::Double, &teams(1), &mut rng),
        Err(BracketError::InsufficientTeams { count: 1 })
    ));
    assert!(matches!(
        generate_matches(Uuid::new_v4(), EliminationType::Single, &teams(33), &mut rng),
        Err(BracketError::TooManyTeams { count: 33 })
    ));
}
