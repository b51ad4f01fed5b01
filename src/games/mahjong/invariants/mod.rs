//! First-class invariants for mahjong game state.
//!
//! Invariants are logical properties that must hold after every state
//! transition. They are testable independently and checked by the session
//! after each mutation.

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn check<S, I: Invariant<S>>(state: &S, violations: &mut Vec<InvariantViolation>) {
    if !I::holds(state) {
        violations.push(InvariantViolation::new(I::description()));
    }
}

fn finish(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        check::<S, I3>(state, &mut violations);
        check::<S, I4>(state, &mut violations);
        finish(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check::<S, I1>(state, &mut violations);
        check::<S, I2>(state, &mut violations);
        finish(violations)
    }
}

pub mod all_seats;
pub mod round_numbering;
pub mod totals_replay;
pub mod zero_sum;

pub use all_seats::AllSeatsInvariant;
pub use round_numbering::RoundNumberingInvariant;
pub use totals_replay::TotalsReplayInvariant;
pub use zero_sum::ZeroSumInvariant;

/// All mahjong invariants as a composable set.
pub type MahjongInvariants = (
    AllSeatsInvariant,
    RoundNumberingInvariant,
    ZeroSumInvariant,
    TotalsReplayInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::mahjong::{GameSettings, GameState, RoundInput, Wind};

    fn game() -> GameState {
        GameState::new(&["A", "B", "C", "D"], GameSettings::default(), 0)
    }

    #[test]
    fn test_invariant_set_holds_for_new_game() {
        assert!(MahjongInvariants::check_all(&game()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_rounds() {
        let mut state = game();
        state.record_round(&RoundInput::discard(Wind::East, Wind::West, 2), 1).unwrap();
        state.record_round(&RoundInput::self_draw(Wind::South, 4), 2).unwrap();
        state.record_round(&RoundInput::draw(), 3).unwrap();
        assert!(MahjongInvariants::check_all(&state).is_ok());
    }

    #[test]
    fn test_invariant_set_detects_violations() {
        let mut state = game();
        state.record_round(&RoundInput::discard(Wind::East, Wind::West, 2), 1).unwrap();
        state.players[0].total_score += 5;
        state.current_round_number = 7;

        let violations = MahjongInvariants::check_all(&state).unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (AllSeatsInvariant, ZeroSumInvariant);
        assert!(TwoInvariants::check_all(&game()).is_ok());
    }
}
