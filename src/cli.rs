//! Command-line interface for strictly_mahjong.

use clap::{Args, Parser, Subcommand};
use strictly_mahjong::{HandType, PartialSettings, Wind};

/// Strictly Mahjong - scorekeeper for four-player Taiwanese mahjong
#[derive(Parser, Debug)]
#[command(name = "strictly_mahjong")]
#[command(about = "Scorekeeper for four-player Taiwanese mahjong", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "strictly_mahjong.toml")]
    pub config: std::path::PathBuf,

    /// Database file (overrides the config file)
    #[arg(long)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a new game (names are seated East, South, West, North)
    New {
        /// Player names
        names: Vec<String>,

        /// Settings overrides for this game
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Record a self-drawn win
    SelfDraw {
        /// Winning seat
        winner: Wind,

        /// Tai count of the hand
        tai: i64,

        /// Hand pattern tags (repeatable)
        #[arg(long = "hand")]
        hands: Vec<HandType>,
    },

    /// Record a win off another player's discard
    Discard {
        /// Winning seat
        winner: Wind,

        /// Discarding seat
        loser: Wind,

        /// Tai count of the hand
        tai: i64,

        /// Hand pattern tags (repeatable)
        #[arg(long = "hand")]
        hands: Vec<HandType>,
    },

    /// Record a drawn game
    Draw,

    /// Delete a round and every round after it
    Delete {
        /// Round identifier (see `show`)
        round_id: String,
    },

    /// Rebuild player totals from the round log
    Recalc,

    /// End the current game and archive it
    End,

    /// Show the current game
    Show,

    /// Show statistics for the current game
    Stats,

    /// List completed games
    History,

    /// Show or update default settings for new games
    Settings {
        /// Values to change
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Discard the current game
    Clear {
        /// Also delete the completed-games archive
        #[arg(long)]
        history: bool,
    },
}

/// Game settings flags.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Currency value per tai
    #[arg(long)]
    pub base_point: Option<i64>,

    /// Tai always counted on top of the hand
    #[arg(long)]
    pub base_multiplier: Option<i64>,

    /// Score each player starts with
    #[arg(long, allow_negative_numbers = true)]
    pub starting_score: Option<i64>,

    /// Dealer-aware self-draw payments
    #[arg(long)]
    pub continuous_dealer: Option<bool>,

    /// Flower tiles add tai
    #[arg(long)]
    pub flower_tiles: Option<bool>,

    /// Honor tiles add tai
    #[arg(long)]
    pub honor_tiles: Option<bool>,

    /// Special-draw bonus
    #[arg(long)]
    pub liu_liu: Option<bool>,
}

impl From<SettingsArgs> for PartialSettings {
    fn from(args: SettingsArgs) -> Self {
        Self {
            base_point: args.base_point,
            base_multiplier: args.base_multiplier,
            starting_score: args.starting_score,
            enable_continuous_dealer: args.continuous_dealer,
            enable_flower_tiles: args.flower_tiles,
            enable_honor_tiles: args.honor_tiles,
            enable_liu_liu: args.liu_liu,
        }
    }
}
