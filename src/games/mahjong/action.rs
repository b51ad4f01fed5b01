//! Round submissions and the errors they can produce.
//!
//! A round submission is a domain event: it captures what happened at the
//! table and can be validated before any score moves.

use super::types::{HandType, WinType, Wind};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The outcome of a round as reported by the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct RoundInput {
    /// Winning seat. Ignored for a drawn game.
    pub winner: Wind,
    /// How the round ended.
    pub win_type: WinType,
    /// Scoring units of the winning hand.
    pub tai: i64,
    /// Discarding seat, required for discard wins.
    pub loser: Option<Wind>,
    /// Hand pattern tags.
    #[serde(default)]
    pub hand_types: Vec<HandType>,
}

impl RoundInput {
    /// A self-drawn win.
    #[instrument]
    pub fn self_draw(winner: Wind, tai: i64) -> Self {
        Self::new(winner, WinType::SelfDraw, tai, None, Vec::new())
    }

    /// A win off `loser`'s discard.
    #[instrument]
    pub fn discard(winner: Wind, loser: Wind, tai: i64) -> Self {
        Self::new(winner, WinType::Discard, tai, Some(loser), Vec::new())
    }

    /// A drawn game.
    #[instrument]
    pub fn draw() -> Self {
        Self::new(Wind::East, WinType::Draw, 0, None, Vec::new())
    }

    /// Attaches hand pattern tags.
    pub fn with_hand_types(mut self, hand_types: Vec<HandType>) -> Self {
        self.hand_types = hand_types;
        self
    }

    /// Checks the seat and tai constraints that do not depend on settings.
    ///
    /// # Errors
    ///
    /// Returns [`RoundError`] describing the first violated constraint.
    #[instrument]
    pub fn validate(&self) -> Result<(), RoundError> {
        validate_outcome(self.winner, self.win_type, self.loser, self.tai)
    }
}

impl std::fmt::Display for RoundInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.win_type, self.loser) {
            (WinType::Draw, _) => write!(f, "drawn game"),
            (WinType::Discard, Some(loser)) => {
                write!(f, "{} wins off {} ({} tai)", self.winner, loser, self.tai)
            }
            _ => write!(f, "{} {} ({} tai)", self.winner, self.win_type, self.tai),
        }
    }
}

/// Shared precondition check for a round outcome.
pub(crate) fn validate_outcome(
    winner: Wind,
    win_type: WinType,
    loser: Option<Wind>,
    tai: i64,
) -> Result<(), RoundError> {
    if tai < 0 {
        return Err(RoundError::NegativeTai(tai));
    }
    match (win_type, loser) {
        (WinType::Discard, None) => Err(RoundError::MissingLoser(winner)),
        (WinType::Discard, Some(loser)) if loser == winner => {
            Err(RoundError::LoserIsWinner(winner))
        }
        (WinType::SelfDraw | WinType::Draw, Some(loser)) => {
            Err(RoundError::UnexpectedLoser(loser, win_type))
        }
        _ => Ok(()),
    }
}

/// Invalid input for a round (rejected before any state changes).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RoundError {
    /// A discard win was submitted without the discarding seat.
    #[display("Discard win by {} requires a loser", _0)]
    MissingLoser(Wind),

    /// The discarding seat is the winner.
    #[display("{} cannot discard into their own win", _0)]
    LoserIsWinner(Wind),

    /// A loser was submitted for a round that has none.
    #[display("Loser {} given for a {} round", _0, _1)]
    UnexpectedLoser(Wind, WinType),

    /// Tai count below zero.
    #[display("Tai count must be non-negative, got {}", _0)]
    NegativeTai(i64),

    /// Base point of zero or less.
    #[display("Base point must be positive, got {}", _0)]
    NonPositiveBasePoint(i64),

    /// Base multiplier below zero.
    #[display("Base multiplier must be non-negative, got {}", _0)]
    NegativeMultiplier(i64),

    /// The round's payments do not fit in a score.
    #[display("Score for {} tai is out of range", _0)]
    ValueOverflow(i64),

    /// A hand tag whose bonus is switched off in the game settings.
    #[display("Hand type {} is disabled by the game settings", _0)]
    HandTypeDisabled(HandType),
}

impl std::error::Error for RoundError {}

/// Error returned by game session operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum GameError {
    /// No game is in progress (none started, or it has ended).
    #[display("No active game")]
    NoActiveGame,

    /// No round with the given identifier exists.
    #[display("Round '{}' not found", _0)]
    RoundNotFound(String),

    /// The round submission was rejected.
    #[display("Invalid input: {}", _0)]
    #[from]
    InvalidInput(RoundError),
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::InvalidInput(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_requires_loser() {
        let input = RoundInput::new(Wind::East, WinType::Discard, 3, None, Vec::new());
        assert_eq!(input.validate(), Err(RoundError::MissingLoser(Wind::East)));
    }

    #[test]
    fn test_loser_must_differ_from_winner() {
        let input = RoundInput::discard(Wind::South, Wind::South, 1);
        assert_eq!(input.validate(), Err(RoundError::LoserIsWinner(Wind::South)));
    }

    #[test]
    fn test_self_draw_rejects_loser() {
        let input = RoundInput::new(Wind::East, WinType::SelfDraw, 1, Some(Wind::West), Vec::new());
        assert!(matches!(
            input.validate(),
            Err(RoundError::UnexpectedLoser(Wind::West, WinType::SelfDraw))
        ));
    }

    #[test]
    fn test_negative_tai_rejected() {
        let input = RoundInput::self_draw(Wind::North, -1);
        assert_eq!(input.validate(), Err(RoundError::NegativeTai(-1)));
    }

    #[test]
    fn test_round_error_converts_into_game_error() {
        let err: GameError = RoundError::NegativeTai(-2).into();
        assert!(err.to_string().contains("non-negative"));
    }
}
