//! Four-player Taiwanese mahjong scorekeeping.

mod action;
mod game;
pub mod invariants;
mod rules;
mod snapshot;
mod statistics;
mod types;

pub use action::{GameError, RoundError, RoundInput};
pub use game::placeholder_name;
pub use rules::{
    DealerContext, DealerRotation, DealerSeat, compute_score_changes, replay_rotation,
    rotate_dealer, round_value,
};
pub use snapshot::{SnapshotError, history_from_snapshot, settings_from_snapshot};
pub use statistics::{GameStatistics, PlayerStatistics};
pub use types::{
    DEFAULT_BASE_MULTIPLIER, DEFAULT_BASE_POINT, DEFAULT_STARTING_SCORE, GameSettings, GameState,
    HandType, ParseWindError, PartialSettings, Player, Round, ScoreChange, WinType, Wind,
};
