//! Every wind is seated exactly once.

use super::super::{GameState, Wind};
use super::Invariant;

/// Invariant: The game has four players, one per wind, in rotation order.
pub struct AllSeatsInvariant;

impl Invariant<GameState> for AllSeatsInvariant {
    fn holds(state: &GameState) -> bool {
        state.players().len() == Wind::ALL.len()
            && state
                .players()
                .iter()
                .zip(Wind::ALL)
                .all(|(player, wind)| player.position == wind)
    }

    fn description() -> &'static str {
        "Four players seated one per wind in rotation order"
    }
}
