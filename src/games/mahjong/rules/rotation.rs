//! Dealer rotation and streak tracking.

use super::super::types::{WinType, Wind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Who deals the next round and how many times they have kept the seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct DealerSeat {
    /// Dealer seat.
    pub dealer: Wind,
    /// Consecutive retentions.
    pub streak: u32,
}

impl Default for DealerSeat {
    fn default() -> Self {
        Self {
            dealer: Wind::East,
            streak: 0,
        }
    }
}

impl DealerSeat {
    /// Applies one round outcome to this seat.
    #[instrument]
    pub fn rotate(self, win_type: WinType, winner: Wind) -> DealerRotation {
        rotate_dealer(self.dealer, self.streak, win_type, winner)
    }
}

/// Result of applying a round outcome to the dealer seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DealerRotation {
    /// Dealer kept the seat (won, or the game was drawn).
    pub is_dealer_win: bool,
    /// Dealer for the next round.
    pub next_dealer: Wind,
    /// Streak after this round.
    pub streak: u32,
}

impl DealerRotation {
    /// The seat going into the next round.
    pub fn seat(&self) -> DealerSeat {
        DealerSeat::new(self.next_dealer, self.streak)
    }
}

/// Decides the next dealer and streak after a round.
///
/// A drawn game or a dealer win keeps the seat and extends the streak by one.
/// Any other win passes the seat to the next wind and resets the streak.
#[instrument]
pub fn rotate_dealer(current: Wind, streak: u32, win_type: WinType, winner: Wind) -> DealerRotation {
    let retained = win_type == WinType::Draw || winner == current;

    let rotation = if retained {
        DealerRotation {
            is_dealer_win: true,
            next_dealer: current,
            streak: streak.saturating_add(1),
        }
    } else {
        DealerRotation {
            is_dealer_win: false,
            next_dealer: current.next(),
            streak: 0,
        }
    };

    debug!(
        ?current,
        next = ?rotation.next_dealer,
        streak = rotation.streak,
        "Dealer rotated"
    );
    rotation
}

/// Replays a sequence of outcomes from the opening seat (East, streak 0).
#[instrument(skip(outcomes))]
pub fn replay_rotation<I>(outcomes: I) -> DealerSeat
where
    I: IntoIterator<Item = (WinType, Wind)>,
{
    outcomes
        .into_iter()
        .fold(DealerSeat::default(), |seat, (win_type, winner)| {
            seat.rotate(win_type, winner).seat()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dealer_win_retains_seat() {
        let rotation = rotate_dealer(Wind::East, 0, WinType::SelfDraw, Wind::East);
        assert!(rotation.is_dealer_win);
        assert_eq!(rotation.next_dealer, Wind::East);
        assert_eq!(rotation.streak, 1);
    }

    #[test]
    fn test_draw_retains_seat() {
        let rotation = rotate_dealer(Wind::West, 2, WinType::Draw, Wind::North);
        assert!(rotation.is_dealer_win);
        assert_eq!(rotation.next_dealer, Wind::West);
        assert_eq!(rotation.streak, 3);
    }

    #[test]
    fn test_non_dealer_win_passes_seat() {
        let rotation = rotate_dealer(Wind::North, 5, WinType::Discard, Wind::South);
        assert!(!rotation.is_dealer_win);
        assert_eq!(rotation.next_dealer, Wind::East);
        assert_eq!(rotation.streak, 0);
    }

    #[test]
    fn test_replay_matches_step_by_step() {
        let outcomes = [
            (WinType::SelfDraw, Wind::East),
            (WinType::Draw, Wind::East),
            (WinType::Discard, Wind::West),
            (WinType::Discard, Wind::South),
        ];
        let seat = replay_rotation(outcomes);
        assert_eq!(seat, DealerSeat::new(Wind::South, 1));
    }

    #[test]
    fn test_replay_of_nothing_is_opening_seat() {
        assert_eq!(replay_rotation(Vec::<(WinType, Wind)>::new()), DealerSeat::default());
    }
}
