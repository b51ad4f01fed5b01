//! Score transfer rules for a finished round.

use super::super::action::{RoundError, validate_outcome};
use super::super::types::{ScoreChange, WinType, Wind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// The dealer seat and its streak going into a round.
///
/// Passing a context switches self-draw scoring to dealer-aware payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct DealerContext {
    /// Seat holding the dealer role.
    pub dealer: Wind,
    /// Consecutive retentions before this round.
    pub streak: u32,
}

impl DealerContext {
    /// Bonus tai attached to the dealer: one for dealing plus two per retention.
    pub fn extra_tai(&self) -> i64 {
        i64::from(self.streak) * 2 + 1
    }
}

/// Value of a round at `tai` scoring units.
///
/// # Errors
///
/// Returns [`RoundError::ValueOverflow`] if the value does not fit in an `i64`.
#[instrument]
pub fn round_value(base_multiplier: i64, tai: i64, base_point: i64) -> Result<i64, RoundError> {
    base_multiplier
        .checked_add(tai)
        .and_then(|units| units.checked_mul(base_point))
        .ok_or(RoundError::ValueOverflow(tai))
}

/// Computes every seat's score delta for a round.
///
/// Discard wins and self-draws list all four seats in rotation order, with
/// zero for uninvolved seats. A drawn game returns an empty list. The deltas
/// always sum to zero.
///
/// # Errors
///
/// Returns [`RoundError`] when the outcome is malformed (discard without a
/// distinct loser, loser on a non-discard round, negative tai) or the
/// settings are unusable (non-positive base point, negative multiplier), or
/// when a payment does not fit in an `i64`.
#[instrument]
pub fn compute_score_changes(
    winner: Wind,
    win_type: WinType,
    loser: Option<Wind>,
    tai: i64,
    base_point: i64,
    base_multiplier: i64,
    dealer: Option<DealerContext>,
) -> Result<Vec<ScoreChange>, RoundError> {
    validate_outcome(winner, win_type, loser, tai)?;
    if base_point <= 0 {
        return Err(RoundError::NonPositiveBasePoint(base_point));
    }
    if base_multiplier < 0 {
        return Err(RoundError::NegativeMultiplier(base_multiplier));
    }

    let total = round_value(base_multiplier, tai, base_point)?;

    let changes = match (win_type, loser) {
        (WinType::Draw, _) => Vec::new(),
        (WinType::Discard, Some(loser)) => Wind::ALL
            .iter()
            .map(|&position| {
                let change = if position == winner {
                    total
                } else if position == loser {
                    -total
                } else {
                    0
                };
                ScoreChange::new(position, change)
            })
            .collect(),
        (WinType::Discard, None) => return Err(RoundError::MissingLoser(winner)),
        (WinType::SelfDraw, _) => {
            self_draw_changes(winner, tai, base_point, base_multiplier, dealer)?
        }
    };

    debug!(total, count = changes.len(), "Score changes computed");
    Ok(changes)
}

/// Payments for a self-drawn win.
fn self_draw_changes(
    winner: Wind,
    tai: i64,
    base_point: i64,
    base_multiplier: i64,
    dealer: Option<DealerContext>,
) -> Result<Vec<ScoreChange>, RoundError> {
    let full = round_value(base_multiplier, tai, base_point)?;

    // Ordinary opponents pay without the dealer's bonus tai, unless the
    // dealer is the winner, in which case everyone pays in full.
    let ordinary = match dealer {
        Some(ctx) if ctx.dealer != winner => {
            let base_tai = tai - ctx.extra_tai();
            if base_tai < 0 {
                warn!(
                    tai,
                    extra_tai = ctx.extra_tai(),
                    "Tai below dealer bonus, clamping opponent payment to zero tai"
                );
            }
            round_value(base_multiplier, base_tai.max(0), base_point)?
        }
        _ => full,
    };

    let payment = |position: Wind| match dealer {
        Some(ctx) if ctx.dealer == position => full,
        _ => ordinary,
    };

    let received = Wind::ALL
        .iter()
        .filter(|&&p| p != winner)
        .try_fold(0i64, |sum, &p| sum.checked_add(payment(p)))
        .ok_or(RoundError::ValueOverflow(tai))?;

    Ok(Wind::ALL
        .iter()
        .map(|&position| {
            if position == winner {
                ScoreChange::new(position, received)
            } else {
                ScoreChange::new(position, -payment(position))
            }
        })
        .collect())
}
