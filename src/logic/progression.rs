//! Match completion: record the result, move winner and loser on, detect the
//! end of the tournament and the bracket reset.

use crate::logic::graph::{Advancement, MatchGraph};
use crate::models::{BracketError, MatchId, MatchKey, MatchStatus, Phase, Scores, Slot, TeamId};
use chrono::Utc;
use serde::Serialize;

/// What a completion did to the bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub match_id: MatchId,
    pub winner_id: TeamId,
    pub loser_id: TeamId,
    pub winner_advanced: Advancement,
    pub loser_advanced: Advancement,
    pub tournament_complete: bool,
    /// The losers-bracket side took the grand final; the reset match is now scheduled.
    pub bracket_reset: bool,
    pub champion: Option<TeamId>,
}

impl CompletionOutcome {
    /// Either team moved into another match.
    pub fn advanced(&self) -> bool {
        self.winner_advanced.is_placed() || self.loser_advanced.is_placed()
    }
}

/// Complete `match_id` with `winner_id` and route both teams.
///
/// Preconditions are checked before anything is written. An
/// `AdvancementTargetMissing` error may leave the graph partially updated;
/// callers discard the graph on error.
pub fn complete_match(
    graph: &mut MatchGraph,
    match_id: MatchId,
    winner_id: TeamId,
    scores: Option<Scores>,
) -> Result<CompletionOutcome, BracketError> {
    let idx = graph
        .index_of(match_id)
        .ok_or(BracketError::MatchNotFound(match_id))?;
    let m = &graph.matches()[idx];
    match m.status {
        MatchStatus::Completed => return Err(BracketError::MatchAlreadyCompleted(match_id)),
        MatchStatus::Hidden | MatchStatus::Bye => return Err(BracketError::MatchNotReady(match_id)),
        MatchStatus::Scheduled => {}
    }
    let (Some(team1), Some(team2)) = (m.team1_id, m.team2_id) else {
        return Err(BracketError::MatchNotReady(match_id));
    };
    let loser_id = if winner_id == team1 {
        team2
    } else if winner_id == team2 {
        team1
    } else {
        return Err(BracketError::InvalidWinner {
            match_id,
            team_id: winner_id,
        });
    };
    if let Some(s) = scores {
        let (winner_score, loser_score) = if winner_id == team1 {
            (s.team1, s.team2)
        } else {
            (s.team2, s.team1)
        };
        if winner_score < loser_score {
            return Err(BracketError::InvalidScores(match_id));
        }
    }
    let key = m.key();

    let m = graph.match_mut(idx);
    m.winner_id = Some(winner_id);
    m.status = MatchStatus::Completed;
    m.score_team1 = scores.map(|s| s.team1);
    m.score_team2 = scores.map(|s| s.team2);
    m.completed_at = Some(Utc::now());

    let mut bracket_reset = false;
    let (winner_advanced, loser_advanced) = match key.phase {
        Phase::GrandFinal if winner_id == team1 => (Advancement::Champion, Advancement::Eliminated),
        Phase::GrandFinal => {
            bracket_reset = true;
            open_reset(graph, key, team1, team2)?
        }
        Phase::BracketReset => (Advancement::Champion, Advancement::Eliminated),
        Phase::Winners(_) | Phase::Losers(_) => {
            let w = graph.route_winner(key, winner_id)?;
            let l = graph.route_loser(key, loser_id)?;
            (w, l)
        }
    };
    graph.settle()?;

    let champion = (winner_advanced == Advancement::Champion).then_some(winner_id);
    Ok(CompletionOutcome {
        match_id,
        winner_id,
        loser_id,
        winner_advanced,
        loser_advanced,
        tournament_complete: champion.is_some(),
        bracket_reset,
        champion,
    })
}

/// The losers side won the grand final: replay it in the reset match with the
/// same sides (winners-bracket team in team1).
fn open_reset(
    graph: &mut MatchGraph,
    from: MatchKey,
    winners_side: TeamId,
    losers_side: TeamId,
) -> Result<(Advancement, Advancement), BracketError> {
    let target = MatchKey::bracket_reset();
    let idx = graph
        .index_of_key(target)
        .ok_or(BracketError::AdvancementTargetMissing {
            from,
            target: Some(target),
        })?;
    let reset = graph.match_mut(idx);
    if reset.status != MatchStatus::Hidden {
        return Err(BracketError::AdvancementTargetMissing {
            from,
            target: Some(target),
        });
    }
    reset.team1_id = Some(winners_side);
    reset.team2_id = Some(losers_side);
    reset.status = MatchStatus::Scheduled;
    let match_id = reset.id;
    log::info!("Losers side won the grand final; bracket reset {} scheduled", match_id);
    let placed = |slot| Advancement::Placed {
        match_id,
        round_number: target.phase.round_number(),
        match_order: target.order,
        slot,
    };
    Ok((placed(Slot::Team2), placed(Slot::Team1)))
}
