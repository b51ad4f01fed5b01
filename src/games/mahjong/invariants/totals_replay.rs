//! Totals invariant: running scores equal a replay of the round log.

use super::super::GameState;
use super::Invariant;

/// Invariant: Each player's total equals the starting score plus their deltas.
pub struct TotalsReplayInvariant;

impl Invariant<GameState> for TotalsReplayInvariant {
    fn holds(state: &GameState) -> bool {
        state
            .players()
            .iter()
            .all(|p| p.total_score == state.replayed_total(p.position))
    }

    fn description() -> &'static str {
        "Player totals equal the starting score plus all recorded deltas"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::mahjong::{GameSettings, PartialSettings, RoundInput, Wind};

    #[test]
    fn test_totals_hold_with_starting_score() {
        let settings = PartialSettings {
            starting_score: Some(1_000),
            ..Default::default()
        }
        .merge_over(&GameSettings::default());
        let mut state = GameState::new(&["A"], settings, 0);
        state.record_round(&RoundInput::self_draw(Wind::South, 3), 1).unwrap();
        assert!(TotalsReplayInvariant::holds(&state));
        assert_eq!(state.player(Wind::South).map(|p| p.total_score), Some(1_150));
    }

    #[test]
    fn test_drifted_total_detected() {
        let mut state = GameState::new(&["A"], GameSettings::default(), 0);
        state.players[2].total_score = 7;
        assert!(!TotalsReplayInvariant::holds(&state));
    }
}
