//! Strictly Mahjong library - scorekeeping for four-player Taiwanese mahjong
//!
//! Tracks a table's running scores round by round: computes per-seat
//! payments from tai counts, follows the dealer seat and its win streak, and
//! persists each game as a JSON snapshot in a key-value store.
//!
//! # Architecture
//!
//! - **Games**: Scoring rules, dealer rotation and game state
//! - **Session**: Game controller that persists after every change
//! - **Storage**: Key-value contract with in-memory and SQLite stores
//!
//! # Example
//!
//! ```
//! use strictly_mahjong::{GameSession, MemoryStore, RoundInput, Wind};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut session = GameSession::new(MemoryStore::new());
//! session.start_game(&["Ann", "Bo", "Cy", "Di"], None);
//!
//! let round = session.add_round(RoundInput::discard(Wind::East, Wind::South, 3))?;
//! assert_eq!(round.change_for(Wind::East), 50);
//! assert_eq!(round.change_for(Wind::South), -50);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod format;
mod games;
mod session;
mod storage;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError};

// Crate-level exports - Database
pub use db::{KvEntry, NewKvEntry, SqliteStore, StoreError};

// Crate-level exports - Display formatting
pub use format::{format_date, format_date_time, format_number, format_percentage, format_score};

// Crate-level exports - Game types (mahjong)
pub use games::mahjong::{
    DEFAULT_BASE_MULTIPLIER, DEFAULT_BASE_POINT, DEFAULT_STARTING_SCORE, DealerContext,
    DealerRotation, DealerSeat, GameError, GameSettings, GameState, GameStatistics, HandType,
    ParseWindError, PartialSettings, Player, PlayerStatistics, Round, RoundError, RoundInput,
    ScoreChange, SnapshotError, WinType, Wind, compute_score_changes, history_from_snapshot,
    placeholder_name, replay_rotation, rotate_dealer, round_value, settings_from_snapshot,
};

// Crate-level exports - Invariant checks
pub use games::mahjong::invariants;

// Crate-level exports - Session management
pub use session::GameSession;

// Crate-level exports - Storage
pub use storage::{
    CURRENT_GAME_KEY, GAME_HISTORY_KEY, GAME_SETTINGS_KEY, JsonStorage, KeyValueStore, MemoryStore,
};
