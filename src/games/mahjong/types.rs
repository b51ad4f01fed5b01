//! Core domain types for mahjong scorekeeping.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Default currency value of one scoring unit.
pub const DEFAULT_BASE_POINT: i64 = 10;

/// Default number of scoring units always counted on top of the hand's tai.
pub const DEFAULT_BASE_MULTIPLIER: i64 = 2;

/// Default score every player starts a game with.
pub const DEFAULT_STARTING_SCORE: i64 = 0;

/// A seat at the table, named by its wind.
///
/// Declaration order is the rotation order of the dealer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Wind {
    /// East seat (first dealer).
    East,
    /// South seat.
    South,
    /// West seat.
    West,
    /// North seat.
    North,
}

impl Wind {
    /// All four winds in rotation order.
    pub const ALL: [Wind; 4] = [Wind::East, Wind::South, Wind::West, Wind::North];

    /// Returns the seat after this one in rotation order (cyclic).
    #[instrument]
    pub fn next(self) -> Self {
        match self {
            Wind::East => Wind::South,
            Wind::South => Wind::West,
            Wind::West => Wind::North,
            Wind::North => Wind::East,
        }
    }

    /// Zero-based index in rotation order.
    #[instrument]
    pub fn index(self) -> usize {
        match self {
            Wind::East => 0,
            Wind::South => 1,
            Wind::West => 2,
            Wind::North => 3,
        }
    }

    /// Creates a wind from its rotation index.
    #[instrument]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get label for this wind (for display).
    pub fn label(self) -> &'static str {
        match self {
            Wind::East => "East",
            Wind::South => "South",
            Wind::West => "West",
            Wind::North => "North",
        }
    }

    /// The wind's tile character.
    pub fn glyph(self) -> &'static str {
        match self {
            Wind::East => "東",
            Wind::South => "南",
            Wind::West => "西",
            Wind::North => "北",
        }
    }
}

impl std::fmt::Display for Wind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Error returned when a string does not name a wind.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Unknown wind: '{}'", _0)]
pub struct ParseWindError(String);

impl std::error::Error for ParseWindError {}

impl FromStr for Wind {
    type Err = ParseWindError;

    /// Parses a label (case-insensitive), its first letter, a glyph, or an index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| ParseWindError(s.to_string()));
        }

        let lower = trimmed.to_lowercase();
        <Wind as strum::IntoEnumIterator>::iter()
            .find(|wind| {
                let label = wind.label().to_lowercase();
                lower == label || lower == label[..1] || trimmed == wind.glyph()
            })
            .ok_or_else(|| ParseWindError(s.to_string()))
    }
}

/// How a round ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WinType {
    /// Winner drew the winning tile; opponents share the payment.
    SelfDraw,
    /// Winner claimed another player's discard; the discarder pays.
    Discard,
    /// Nobody won; no money changes hands.
    Draw,
}

impl WinType {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            WinType::SelfDraw => "self-drawn",
            WinType::Discard => "discard",
            WinType::Draw => "drawn game",
        }
    }
}

impl std::fmt::Display for WinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Hand pattern tags recorded alongside a win.
///
/// Tags are descriptive; the tai count a caller submits already accounts for them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HandType {
    /// 屁胡
    ButtHu,
    /// 平胡
    Common,
    /// 門清
    ConcealedHand,
    /// 碰碰胡
    AllPungs,
    /// 混一色
    MixedOneSuit,
    /// 全求人
    AllHuman,
    /// 三暗刻
    ThreeConcealedPungs,
    /// 四暗刻
    FourConcealedPungs,
    /// 五暗刻
    FiveConcealedPungs,
    /// 單吊
    WaitingOne,
    /// 邊張
    EdgeWait,
    /// 中洞
    MiddleWait,
    /// Migi
    Migi,
    /// 槓上開花
    KongOnKong,
    /// 搶槓
    RobbingKong,
    /// 紅中
    RedDragon,
    /// 青發
    GreenDragon,
    /// 白板
    WhiteDragon,
    /// 小三元
    SmallThreeDragons,
    /// 大三元
    BigThreeDragons,
    /// 東風
    EastWind,
    /// 南風
    SouthWind,
    /// 西風
    WestWind,
    /// 北風
    NorthWind,
    /// 小四喜
    SmallFourWinds,
    /// 大四喜
    BigFourWinds,
    /// 正花: the flower matching the player's own seat.
    CorrectFlower,
    /// 八仙過海: all eight flowers.
    AllFlowers,
    /// 海底撈月
    LastTileDraw,
    /// 天胡
    BlessingOfHeaven,
    /// 地胡
    BlessingOfEarth,
    /// 字一色
    AllHonors,
    /// 清一色
    AllOneSuit,
    /// 嚦咕嚦咕
    LiuLiu,
}

impl HandType {
    /// Whether the tag only counts when honor-tile bonuses are enabled.
    pub fn requires_honor_tiles(self) -> bool {
        matches!(
            self,
            HandType::RedDragon
                | HandType::GreenDragon
                | HandType::WhiteDragon
                | HandType::SmallThreeDragons
                | HandType::BigThreeDragons
                | HandType::EastWind
                | HandType::SouthWind
                | HandType::WestWind
                | HandType::NorthWind
                | HandType::SmallFourWinds
                | HandType::BigFourWinds
        )
    }

    /// Whether the tag only counts when flower-tile bonuses are enabled.
    pub fn requires_flower_tiles(self) -> bool {
        matches!(self, HandType::CorrectFlower | HandType::AllFlowers)
    }

    /// Whether the tag only counts when the special-draw bonus is enabled.
    pub fn requires_liu_liu(self) -> bool {
        self == HandType::LiuLiu
    }
}

impl std::fmt::Display for HandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// A signed score transfer for one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct ScoreChange {
    /// Seat the change applies to.
    pub position: Wind,
    /// Positive for points won, negative for points paid.
    pub change: i64,
}

/// A player seated for the whole game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable identifier (`player_<seat index>`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Seat.
    pub position: Wind,
    /// Running total.
    pub total_score: i64,
}

/// Game configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    /// Currency value per scoring unit.
    pub base_point: i64,
    /// Scoring units always counted on top of the tai.
    pub base_multiplier: i64,
    /// Score each player starts with.
    pub starting_score: i64,
    /// Dealer-aware self-draw payments (連莊).
    pub enable_continuous_dealer: bool,
    /// Flower tiles add tai (見花).
    pub enable_flower_tiles: bool,
    /// Honor tiles add tai (見字).
    pub enable_honor_tiles: bool,
    /// Special-draw bonus (嚦咕嚦咕).
    pub enable_liu_liu: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            base_point: DEFAULT_BASE_POINT,
            base_multiplier: DEFAULT_BASE_MULTIPLIER,
            starting_score: DEFAULT_STARTING_SCORE,
            enable_continuous_dealer: false,
            enable_flower_tiles: false,
            enable_honor_tiles: false,
            enable_liu_liu: false,
        }
    }
}

impl GameSettings {
    /// Whether `hand_type` may be recorded under these settings.
    pub fn allows(&self, hand_type: HandType) -> bool {
        (self.enable_honor_tiles || !hand_type.requires_honor_tiles())
            && (self.enable_flower_tiles || !hand_type.requires_flower_tiles())
            && (self.enable_liu_liu || !hand_type.requires_liu_liu())
    }
}

/// Settings where every field may be absent.
///
/// Used both for caller overrides at game start and for reading settings
/// written by older versions that lacked newer fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialSettings {
    /// Currency value per scoring unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_point: Option<i64>,
    /// Scoring units always counted on top of the tai.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_multiplier: Option<i64>,
    /// Score each player starts with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_score: Option<i64>,
    /// Dealer-aware self-draw payments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_continuous_dealer: Option<bool>,
    /// Flower tiles add tai.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_flower_tiles: Option<bool>,
    /// Honor tiles add tai.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_honor_tiles: Option<bool>,
    /// Special-draw bonus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_liu_liu: Option<bool>,
}

impl PartialSettings {
    /// Overlays the present fields onto `base`.
    #[instrument(skip(self, base))]
    pub fn merge_over(&self, base: &GameSettings) -> GameSettings {
        GameSettings {
            base_point: self.base_point.unwrap_or(base.base_point),
            base_multiplier: self.base_multiplier.unwrap_or(base.base_multiplier),
            starting_score: self.starting_score.unwrap_or(base.starting_score),
            enable_continuous_dealer: self
                .enable_continuous_dealer
                .unwrap_or(base.enable_continuous_dealer),
            enable_flower_tiles: self.enable_flower_tiles.unwrap_or(base.enable_flower_tiles),
            enable_honor_tiles: self.enable_honor_tiles.unwrap_or(base.enable_honor_tiles),
            enable_liu_liu: self.enable_liu_liu.unwrap_or(base.enable_liu_liu),
        }
    }

    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<GameSettings> for PartialSettings {
    fn from(settings: GameSettings) -> Self {
        Self {
            base_point: Some(settings.base_point),
            base_multiplier: Some(settings.base_multiplier),
            starting_score: Some(settings.starting_score),
            enable_continuous_dealer: Some(settings.enable_continuous_dealer),
            enable_flower_tiles: Some(settings.enable_flower_tiles),
            enable_honor_tiles: Some(settings.enable_honor_tiles),
            enable_liu_liu: Some(settings.enable_liu_liu),
        }
    }
}

/// Immutable record of a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Unique identifier among the game's rounds.
    pub(crate) id: String,
    /// 1-based sequence number.
    pub(crate) round_number: u32,
    /// Milliseconds since the Unix epoch.
    pub(crate) timestamp: i64,
    /// Dealer during this round.
    pub(crate) dealer_position: Wind,
    /// Dealer for the following round.
    pub(crate) next_dealer: Wind,
    /// Whether the dealer kept the seat.
    pub(crate) is_dealer_win: bool,
    /// Dealer streak after this round.
    pub(crate) dealer_win_count: u32,
    /// Winning seat. For a drawn game, the dealer who retained the seat.
    pub(crate) winner_position: Wind,
    /// How the round ended.
    pub(crate) win_type: WinType,
    /// Discarding seat, only for discard wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) loser_position: Option<Wind>,
    /// Hand pattern tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) hand_types: Vec<HandType>,
    /// Scoring units of the hand.
    pub(crate) tai: i64,
    /// Base point in effect when the round was scored.
    pub(crate) base_point: i64,
    /// Base multiplier in effect when the round was scored.
    pub(crate) base_multiplier: i64,
    /// Per-seat deltas. Empty for a drawn game.
    pub(crate) score_changes: Vec<ScoreChange>,
}

impl Round {
    /// Returns the delta for `position`, zero when the seat was untouched.
    pub fn change_for(&self, position: Wind) -> i64 {
        self.score_changes
            .iter()
            .find(|c| c.position == position)
            .map_or(0, |c| c.change)
    }
}

/// Complete game state, the aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Game identifier (`game_<start ms>`).
    pub(crate) game_id: String,
    /// Milliseconds since the Unix epoch.
    pub(crate) start_time: i64,
    /// One player per wind, in rotation order.
    pub(crate) players: Vec<Player>,
    /// Round log in sequence order.
    pub(crate) rounds: Vec<Round>,
    /// Settings in effect.
    pub(crate) settings: GameSettings,
    /// Sequence number the next round will receive.
    pub(crate) current_round_number: u32,
    /// Dealer for the next round.
    pub(crate) current_dealer: Wind,
    /// Consecutive retentions by the current dealer.
    pub(crate) dealer_win_count: u32,
    /// False once the game has ended.
    pub(crate) is_active: bool,
}

impl GameState {
    /// Returns the player seated at `position`.
    pub fn player(&self, position: Wind) -> Option<&Player> {
        self.players.iter().find(|p| p.position == position)
    }

    /// Finds a round by identifier.
    pub fn round(&self, round_id: &str) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == round_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_wind_rotation_is_cyclic() {
        assert_eq!(Wind::East.next(), Wind::South);
        assert_eq!(Wind::North.next(), Wind::East);
        let mut wind = Wind::West;
        for _ in 0..4 {
            wind = wind.next();
        }
        assert_eq!(wind, Wind::West);
    }

    #[test]
    fn test_wind_parsing() {
        assert_eq!("east".parse::<Wind>(), Ok(Wind::East));
        assert_eq!("S".parse::<Wind>(), Ok(Wind::South));
        assert_eq!("西".parse::<Wind>(), Ok(Wind::West));
        assert_eq!("3".parse::<Wind>(), Ok(Wind::North));
        assert!("middle".parse::<Wind>().is_err());
        assert!("4".parse::<Wind>().is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Wind::North).unwrap(), "\"north\"");
        assert_eq!(
            serde_json::to_string(&WinType::SelfDraw).unwrap(),
            "\"self_draw\""
        );
        assert_eq!(
            serde_json::to_string(&HandType::BlessingOfHeaven).unwrap(),
            "\"blessing_of_heaven\""
        );
        assert_eq!("liu_liu".parse::<HandType>(), Ok(HandType::LiuLiu));
        assert_eq!("self_draw".parse::<WinType>(), Ok(WinType::SelfDraw));
    }

    #[test]
    fn test_settings_gate_bonus_hand_types() {
        let plain = GameSettings::default();
        assert!(plain.allows(HandType::AllPungs));
        assert!(!plain.allows(HandType::BigThreeDragons));
        assert!(!plain.allows(HandType::AllFlowers));
        assert!(!plain.allows(HandType::LiuLiu));

        let full = GameSettings {
            enable_flower_tiles: true,
            enable_honor_tiles: true,
            enable_liu_liu: true,
            ..GameSettings::default()
        };
        assert!(HandType::iter().all(|h| full.allows(h)));
    }

    #[test]
    fn test_partial_settings_merge() {
        let partial = PartialSettings {
            base_point: Some(50),
            enable_liu_liu: Some(true),
            ..Default::default()
        };
        let merged = partial.merge_over(&GameSettings::default());
        assert_eq!(merged.base_point, 50);
        assert_eq!(merged.base_multiplier, DEFAULT_BASE_MULTIPLIER);
        assert!(merged.enable_liu_liu);
        assert!(!merged.enable_flower_tiles);
    }

    #[test]
    fn test_partial_settings_keeps_explicit_zero() {
        let partial: PartialSettings =
            serde_json::from_str(r#"{"basePoint": 20, "baseMultiplier": 0}"#).unwrap();
        let merged = partial.merge_over(&GameSettings::default());
        assert_eq!(merged.base_multiplier, 0);
        assert_eq!(merged.base_point, 20);
    }
}
