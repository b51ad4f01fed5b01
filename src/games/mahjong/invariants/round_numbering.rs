//! Round numbering invariant: rounds are numbered 1..=n and the counter is n + 1.

use super::super::GameState;
use super::Invariant;

/// Invariant: Round numbers are consecutive from 1 and the next number follows the last.
pub struct RoundNumberingInvariant;

impl Invariant<GameState> for RoundNumberingInvariant {
    fn holds(state: &GameState) -> bool {
        let consecutive = state
            .rounds()
            .iter()
            .zip(1u32..)
            .all(|(round, expected)| *round.round_number() == expected);

        consecutive && *state.current_round_number() as usize == state.rounds().len() + 1
    }

    fn description() -> &'static str {
        "Rounds are numbered consecutively from 1 and the counter is one past the last"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::mahjong::{GameSettings, RoundInput, Wind};

    #[test]
    fn test_counter_follows_rounds() {
        let mut state = GameState::new(&["A"], GameSettings::default(), 0);
        assert!(RoundNumberingInvariant::holds(&state));
        state.record_round(&RoundInput::self_draw(Wind::West, 1), 1).unwrap();
        state.record_round(&RoundInput::self_draw(Wind::West, 1), 2).unwrap();
        assert!(RoundNumberingInvariant::holds(&state));
    }

    #[test]
    fn test_stale_counter_detected() {
        let mut state = GameState::new(&["A"], GameSettings::default(), 0);
        state.record_round(&RoundInput::self_draw(Wind::West, 1), 1).unwrap();
        state.current_round_number = 1;
        assert!(!RoundNumberingInvariant::holds(&state));
    }
}
