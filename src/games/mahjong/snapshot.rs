//! Persisted game snapshots and forward migration of older ones.
//!
//! Snapshots are decoded into a lenient shape where every field added after
//! the first release is optional, then repaired in one pass against
//! [`GameSettings::default`]. Nothing is rejected for being old.

use super::game::{next_round_number, placeholder_name};
use super::rules::DealerSeat;
use super::types::{
    GameSettings, GameState, HandType, PartialSettings, Player, Round, ScoreChange, WinType, Wind,
};
use derive_more::{Display, From};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Error decoding or encoding a snapshot.
#[derive(Debug, Display, From)]
pub enum SnapshotError {
    /// The document is not valid JSON for a game state.
    #[display("Snapshot JSON error: {}", _0)]
    Json(serde_json::Error),
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Json(e) => Some(e),
        }
    }
}

/// Game state as it may appear in storage, from any version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredGameState {
    game_id: String,
    #[serde(default)]
    start_time: i64,
    #[serde(default)]
    players: Vec<Player>,
    #[serde(default)]
    rounds: Vec<StoredRound>,
    #[serde(default)]
    settings: PartialSettings,
    current_round_number: Option<u32>,
    current_dealer: Option<Wind>,
    dealer_win_count: Option<u32>,
    is_active: Option<bool>,
}

/// Round as it may appear in storage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRound {
    id: String,
    round_number: Option<u32>,
    #[serde(default)]
    timestamp: i64,
    dealer_position: Option<Wind>,
    next_dealer: Option<Wind>,
    is_dealer_win: Option<bool>,
    dealer_win_count: Option<u32>,
    winner_position: Wind,
    win_type: WinType,
    loser_position: Option<Wind>,
    #[serde(default)]
    hand_types: Vec<HandType>,
    /// Single tag written by versions before multi-tag support.
    hand_type: Option<HandType>,
    #[serde(default)]
    tai: i64,
    base_point: Option<i64>,
    base_multiplier: Option<i64>,
    #[serde(default)]
    score_changes: Vec<ScoreChange>,
}

impl StoredGameState {
    /// Repairs every missing field with its documented default.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    fn migrate(self) -> GameState {
        let settings = self.settings.merge_over(&GameSettings::default());
        if self.settings != PartialSettings::from(settings) {
            debug!("Backfilled missing settings fields");
        }

        let mut seat = DealerSeat::default();
        let rounds: Vec<Round> = self
            .rounds
            .into_iter()
            .zip(1u32..)
            .map(|(stored, position)| {
                let round = stored.migrate(position, seat, &settings);
                seat = DealerSeat::new(round.next_dealer, round.dealer_win_count);
                round
            })
            .collect();

        let players = migrate_players(self.players, &settings, &rounds);

        GameState {
            game_id: self.game_id,
            start_time: self.start_time,
            players,
            current_round_number: self
                .current_round_number
                .unwrap_or_else(|| next_round_number(&rounds)),
            rounds,
            settings,
            current_dealer: self.current_dealer.unwrap_or(Wind::East),
            dealer_win_count: self.dealer_win_count.unwrap_or(0),
            is_active: self.is_active.unwrap_or(true),
        }
    }
}

impl StoredRound {
    /// Fills missing round fields. `seat` is the dealer seat going into this
    /// round according to the rounds before it.
    fn migrate(self, position: u32, seat: DealerSeat, settings: &GameSettings) -> Round {
        let dealer = self.dealer_position.unwrap_or(seat.dealer);
        let rotation = DealerSeat::new(dealer, seat.streak).rotate(self.win_type, self.winner_position);

        let mut hand_types = self.hand_types;
        if let Some(tag) = self.hand_type
            && !hand_types.contains(&tag)
        {
            hand_types.push(tag);
        }

        Round {
            id: self.id,
            round_number: self.round_number.unwrap_or(position),
            timestamp: self.timestamp,
            dealer_position: dealer,
            next_dealer: self.next_dealer.unwrap_or(rotation.next_dealer),
            is_dealer_win: self.is_dealer_win.unwrap_or(rotation.is_dealer_win),
            dealer_win_count: self.dealer_win_count.unwrap_or(rotation.streak),
            winner_position: self.winner_position,
            win_type: self.win_type,
            loser_position: self.loser_position,
            hand_types,
            tai: self.tai,
            base_point: self.base_point.unwrap_or(settings.base_point),
            // Approximation: the multiplier in effect back then was not saved.
            base_multiplier: self.base_multiplier.unwrap_or(settings.base_multiplier),
            score_changes: self.score_changes,
        }
    }
}

/// Orders players by wind and seats a placeholder in any empty wind.
fn migrate_players(players: Vec<Player>, settings: &GameSettings, rounds: &[Round]) -> Vec<Player> {
    Wind::ALL
        .iter()
        .map(|&wind| {
            players
                .iter()
                .find(|p| p.position == wind)
                .cloned()
                .unwrap_or_else(|| {
                    debug!(?wind, "Seating placeholder for missing player");
                    Player {
                        id: format!("player_{}", wind.index()),
                        name: placeholder_name(wind.index()),
                        position: wind,
                        total_score: rounds.iter().fold(settings.starting_score, |total, r| {
                            total.saturating_add(r.change_for(wind))
                        }),
                    }
                })
        })
        .collect()
}

impl GameState {
    /// Decodes a snapshot written by any version, repairing missing fields.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the document is not a game state at all.
    #[instrument(skip(json), fields(len = json.len()))]
    pub fn from_snapshot(json: &str) -> Result<Self, SnapshotError> {
        let stored: StoredGameState = serde_json::from_str(json)?;
        Ok(stored.migrate())
    }

    /// Encodes this state as a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if serialization fails.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub fn to_snapshot(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Decodes an archive of completed games, migrating each one.
///
/// # Errors
///
/// Returns [`SnapshotError`] if the document is not a list of game states.
#[instrument(skip(json), fields(len = json.len()))]
pub fn history_from_snapshot(json: &str) -> Result<Vec<GameState>, SnapshotError> {
    let stored: Vec<StoredGameState> = serde_json::from_str(json)?;
    Ok(stored.into_iter().map(StoredGameState::migrate).collect())
}

/// Decodes saved settings, filling absent fields from the defaults.
///
/// # Errors
///
/// Returns [`SnapshotError`] if the document is not a settings object.
#[instrument(skip(json), fields(len = json.len()))]
pub fn settings_from_snapshot(json: &str) -> Result<GameSettings, SnapshotError> {
    let partial: PartialSettings = serde_json::from_str(json)?;
    Ok(partial.merge_over(&GameSettings::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::mahjong::RoundInput;

    const LEGACY: &str = r#"{
        "gameId": "game_1700000000000",
        "startTime": 1700000000000,
        "players": [
            {"id": "player_0", "name": "東家", "position": "east", "totalScore": 50},
            {"id": "player_1", "name": "南家", "position": "south", "totalScore": -50},
            {"id": "player_2", "name": "西家", "position": "west", "totalScore": 0},
            {"id": "player_3", "name": "北家", "position": "north", "totalScore": 0}
        ],
        "rounds": [{
            "id": "round_1700000001000",
            "roundNumber": 1,
            "timestamp": 1700000001000,
            "winnerPosition": "east",
            "winType": "discard",
            "loserPosition": "south",
            "handType": "all_pungs",
            "tai": 3,
            "basePoint": 10,
            "scoreChanges": [
                {"position": "east", "change": 50},
                {"position": "south", "change": -50},
                {"position": "west", "change": 0},
                {"position": "north", "change": 0}
            ]
        }],
        "settings": {"basePoint": 10, "startingScore": 0},
        "currentRoundNumber": 2,
        "isActive": true
    }"#;

    #[test]
    fn test_legacy_snapshot_backfills_defaults() {
        let state = GameState::from_snapshot(LEGACY).unwrap();
        assert_eq!(state.settings().base_multiplier, 2);
        assert!(!state.settings().enable_continuous_dealer);
        assert!(!state.settings().enable_liu_liu);
        assert_eq!(*state.current_dealer(), Wind::East);
        assert_eq!(*state.dealer_win_count(), 0);

        let round = &state.rounds()[0];
        assert_eq!(*round.base_multiplier(), 2);
        assert_eq!(*round.dealer_position(), Wind::East);
        assert!(*round.is_dealer_win());
        assert_eq!(*round.dealer_win_count(), 1);
        assert_eq!(round.hand_types(), &vec![HandType::AllPungs]);
    }

    #[test]
    fn test_explicit_zero_multiplier_is_kept() {
        let json = LEGACY.replace(
            r#""settings": {"basePoint": 10, "startingScore": 0}"#,
            r#""settings": {"basePoint": 10, "startingScore": 0, "baseMultiplier": 0}"#,
        );
        let state = GameState::from_snapshot(&json).unwrap();
        assert_eq!(state.settings().base_multiplier, 0);
        assert_eq!(*state.rounds()[0].base_multiplier(), 0);
    }

    #[test]
    fn test_current_snapshot_is_unchanged_by_migration() {
        let mut state = GameState::new(&["A", "B", "C", "D"], GameSettings::default(), 5);
        state.record_round(&RoundInput::self_draw(Wind::East, 2), 6).unwrap();
        state.record_round(&RoundInput::discard(Wind::West, Wind::East, 1), 7).unwrap();

        let json = state.to_snapshot().unwrap();
        assert_eq!(GameState::from_snapshot(&json).unwrap(), state);
    }

    #[test]
    fn test_missing_player_gets_placeholder() {
        let mut doc: serde_json::Value = serde_json::from_str(LEGACY).unwrap();
        if let Some(players) = doc["players"].as_array_mut() {
            players.retain(|p| p["position"] != "south");
        }
        let state = GameState::from_snapshot(&doc.to_string()).unwrap();

        assert_eq!(state.players().len(), 4);
        let south = state.player(Wind::South).unwrap();
        assert_eq!(south.name, "Player 2");
        assert_eq!(south.total_score, -50);
        assert_eq!(state.players()[3].position, Wind::North);
    }

    #[test]
    fn test_settings_snapshot_defaults() {
        let settings = settings_from_snapshot(r#"{"basePoint": 30}"#).unwrap();
        assert_eq!(settings.base_point, 30);
        assert_eq!(settings.base_multiplier, 2);
        assert!(!settings.enable_honor_tiles);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(GameState::from_snapshot("not json").is_err());
        assert!(history_from_snapshot("{}").is_err());
    }
}
