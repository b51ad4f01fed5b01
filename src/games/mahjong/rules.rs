//! Scoring and dealer rotation rules.
//!
//! Both are pure: they read a round outcome and return what should change,
//! leaving the game state untouched.

mod rotation;
mod scoring;

pub use rotation::{DealerRotation, DealerSeat, replay_rotation, rotate_dealer};
pub use scoring::{DealerContext, compute_score_changes, round_value};
