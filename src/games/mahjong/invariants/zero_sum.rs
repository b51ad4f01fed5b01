//! Zero-sum invariant: no round creates or destroys points.

use super::super::{GameState, WinType};
use super::Invariant;

/// Invariant: Every round's deltas sum to zero, and drawn games have none.
pub struct ZeroSumInvariant;

impl Invariant<GameState> for ZeroSumInvariant {
    fn holds(state: &GameState) -> bool {
        state.rounds().iter().all(|round| {
            let sum = round
                .score_changes()
                .iter()
                .try_fold(0i64, |sum, c| sum.checked_add(c.change));
            let draw_is_empty =
                *round.win_type() != WinType::Draw || round.score_changes().is_empty();
            sum == Some(0) && draw_is_empty
        })
    }

    fn description() -> &'static str {
        "Each round's score changes sum to zero"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::mahjong::{GameSettings, RoundInput, ScoreChange, Wind};

    #[test]
    fn test_scored_rounds_hold() {
        let mut state = GameState::new(&["A"], GameSettings::default(), 0);
        state.record_round(&RoundInput::discard(Wind::North, Wind::East, 8), 1).unwrap();
        assert!(ZeroSumInvariant::holds(&state));
    }

    #[test]
    fn test_unbalanced_round_detected() {
        let mut state = GameState::new(&["A"], GameSettings::default(), 0);
        state.record_round(&RoundInput::discard(Wind::North, Wind::East, 8), 1).unwrap();
        state.rounds[0].score_changes.push(ScoreChange::new(Wind::West, 1));
        assert!(!ZeroSumInvariant::holds(&state));
    }
}
