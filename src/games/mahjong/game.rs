//! Game state transitions: starting, recording and retracting rounds.
//!
//! These methods are the only code that mutates a [`GameState`]. Each one
//! either applies all of its effects or returns an error and changes nothing.

use super::action::{GameError, RoundError, RoundInput};
use super::rules::{DealerContext, DealerSeat, compute_score_changes, replay_rotation};
use super::types::{GameSettings, GameState, Player, Round, WinType, Wind};
use tracing::{debug, info, instrument};

/// Name given to a seat whose player name was not supplied.
#[instrument]
pub fn placeholder_name(index: usize) -> String {
    format!("Player {}", index + 1)
}

impl GameState {
    /// Creates a fresh game with East dealing first.
    ///
    /// Names are assigned to winds in rotation order. Missing or blank names
    /// become `"Player N"`; names beyond the fourth are ignored.
    #[instrument(skip(names))]
    pub fn new<N: AsRef<str>>(names: &[N], settings: GameSettings, now_ms: i64) -> Self {
        let players = Wind::ALL
            .iter()
            .enumerate()
            .map(|(index, &position)| {
                let name = names
                    .get(index)
                    .map(|n| n.as_ref().trim())
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| placeholder_name(index));
                Player {
                    id: format!("player_{}", index),
                    name,
                    position,
                    total_score: settings.starting_score,
                }
            })
            .collect();

        let seat = DealerSeat::default();
        let state = Self {
            game_id: format!("game_{}", now_ms),
            start_time: now_ms,
            players,
            rounds: Vec::new(),
            settings,
            current_round_number: 1,
            current_dealer: seat.dealer,
            dealer_win_count: seat.streak,
            is_active: true,
        };
        info!(game_id = %state.game_id, "New game created");
        state
    }

    /// The dealer seat going into the next round.
    pub fn dealer_seat(&self) -> DealerSeat {
        DealerSeat::new(self.current_dealer, self.dealer_win_count)
    }

    /// Dealer context for scoring, present only in continuous-dealer mode.
    pub fn dealer_context(&self) -> Option<DealerContext> {
        self.settings
            .enable_continuous_dealer
            .then(|| DealerContext::new(self.current_dealer, self.dealer_win_count))
    }

    /// Scores a round, rotates the dealer and appends the round to the log.
    ///
    /// The current settings are captured into the round so later settings
    /// changes do not rewrite history.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoActiveGame`] if the game has ended, or
    /// [`GameError::InvalidInput`] if the submission is malformed.
    #[instrument(skip(self), fields(game_id = %self.game_id, round = self.current_round_number))]
    pub fn record_round(&mut self, input: &RoundInput, now_ms: i64) -> Result<&Round, GameError> {
        if !self.is_active {
            return Err(GameError::NoActiveGame);
        }
        if let Some(&disabled) = input.hand_types.iter().find(|&&h| !self.settings.allows(h)) {
            return Err(RoundError::HandTypeDisabled(disabled).into());
        }

        // A drawn game has no winner; the dealer is recorded as keeping the seat.
        let winner = match input.win_type {
            WinType::Draw => self.current_dealer,
            _ => input.winner,
        };

        let score_changes = compute_score_changes(
            winner,
            input.win_type,
            input.loser,
            input.tai,
            self.settings.base_point,
            self.settings.base_multiplier,
            self.dealer_context(),
        )?;

        let rotation = self.dealer_seat().rotate(input.win_type, winner);

        let totals = self
            .players
            .iter()
            .map(|player| {
                score_changes
                    .iter()
                    .filter(|c| c.position == player.position)
                    .try_fold(player.total_score, |total, c| total.checked_add(c.change))
                    .ok_or(RoundError::ValueOverflow(input.tai))
            })
            .collect::<Result<Vec<i64>, RoundError>>()?;
        for (player, total) in self.players.iter_mut().zip(totals) {
            player.total_score = total;
        }

        let round = Round {
            id: format!("round_{}_{}", now_ms, self.current_round_number),
            round_number: self.current_round_number,
            timestamp: now_ms,
            dealer_position: self.current_dealer,
            next_dealer: rotation.next_dealer,
            is_dealer_win: rotation.is_dealer_win,
            dealer_win_count: rotation.streak,
            winner_position: winner,
            win_type: input.win_type,
            loser_position: input.loser,
            hand_types: input.hand_types.clone(),
            tai: input.tai,
            base_point: self.settings.base_point,
            base_multiplier: self.settings.base_multiplier,
            score_changes,
        };

        self.current_round_number = self.current_round_number.saturating_add(1);
        self.current_dealer = rotation.next_dealer;
        self.dealer_win_count = rotation.streak;

        debug!(
            next_dealer = ?self.current_dealer,
            streak = self.dealer_win_count,
            "Round recorded"
        );

        let index = self.rounds.len();
        self.rounds.push(round);
        Ok(&self.rounds[index])
    }

    /// Removes a round and every round after it.
    ///
    /// Later rounds were scored against the removed round's dealer context,
    /// so they go too. Scores and the dealer seat are rebuilt from what
    /// remains. Returns the removed rounds, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoActiveGame`] if the game has ended, or
    /// [`GameError::RoundNotFound`] if no round has that identifier.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub fn retract_round(&mut self, round_id: &str) -> Result<Vec<Round>, GameError> {
        if !self.is_active {
            return Err(GameError::NoActiveGame);
        }

        let index = self
            .rounds
            .iter()
            .position(|r| r.id == round_id)
            .ok_or_else(|| GameError::RoundNotFound(round_id.to_string()))?;

        let removed = self.rounds.split_off(index);
        self.recalculate_scores();
        self.replay_dealer();
        self.current_round_number = next_round_number(&self.rounds);

        info!(removed = removed.len(), remaining = self.rounds.len(), "Rounds retracted");
        Ok(removed)
    }

    /// Resets every player to the starting score and replays all deltas.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub fn recalculate_scores(&mut self) {
        for player in &mut self.players {
            player.total_score = self.settings.starting_score;
        }
        for round in &self.rounds {
            for change in &round.score_changes {
                if let Some(player) = self.players.iter_mut().find(|p| p.position == change.position) {
                    player.total_score = player.total_score.saturating_add(change.change);
                }
            }
        }
        debug!(rounds = self.rounds.len(), "Scores recalculated");
    }

    /// Rebuilds the dealer seat by replaying rotation over the round log.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub fn replay_dealer(&mut self) {
        let seat = replay_rotation(self.rounds.iter().map(|r| (r.win_type, r.winner_position)));
        self.current_dealer = seat.dealer;
        self.dealer_win_count = seat.streak;
    }

    /// The score `position` should hold according to the round log.
    pub fn replayed_total(&self, position: Wind) -> i64 {
        self.rounds
            .iter()
            .fold(self.settings.starting_score, |total, r| {
                total.saturating_add(r.change_for(position))
            })
    }

    /// Marks the game as ended. Returns false if it had already ended.
    #[instrument(skip(self), fields(game_id = %self.game_id))]
    pub fn end(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        info!(rounds = self.rounds.len(), "Game ended");
        true
    }
}

/// Sequence number following the last round in `rounds`.
pub(crate) fn next_round_number(rounds: &[Round]) -> u32 {
    u32::try_from(rounds.len()).map_or(u32::MAX, |n| n.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::mahjong::HandType;

    fn game() -> GameState {
        GameState::new(&["A", "B", "C", "D"], GameSettings::default(), 1_000)
    }

    #[test]
    fn test_missing_names_get_placeholders() {
        let state = GameState::new(&["Alice", "  "], GameSettings::default(), 0);
        let names: Vec<_> = state.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Player 2", "Player 3", "Player 4"]);
    }

    #[test]
    fn test_record_round_captures_settings() {
        let mut state = game();
        let round = state.record_round(&RoundInput::discard(Wind::East, Wind::South, 3), 2_000).unwrap();
        assert_eq!(*round.base_point(), 10);
        assert_eq!(*round.base_multiplier(), 2);
        assert_eq!(*round.round_number(), 1);
        assert_eq!(*state.current_round_number(), 2);
    }

    #[test]
    fn test_record_round_returns_appended_round() {
        let mut state = game();
        state.record_round(&RoundInput::draw(), 2_000).unwrap();
        let id = state
            .record_round(&RoundInput::self_draw(Wind::West, 1), 3_000)
            .unwrap()
            .id()
            .clone();
        assert_eq!(id, "round_3000_2");
        assert_eq!(state.rounds().last().map(|r| r.id()), Some(&id));
    }

    #[test]
    fn test_invalid_round_leaves_state_untouched() {
        let mut state = game();
        let before = state.clone();
        let input = RoundInput::new(Wind::East, WinType::Discard, 3, None, Vec::new());
        assert!(state.record_round(&input, 2_000).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_ended_game_rejects_rounds() {
        let mut state = game();
        assert!(state.end());
        assert!(!state.end());
        assert_eq!(
            state.record_round(&RoundInput::self_draw(Wind::East, 1), 2_000).err(),
            Some(GameError::NoActiveGame)
        );
    }

    #[test]
    fn test_disabled_hand_type_rejected() {
        let mut state = game();
        let before = state.clone();
        let input =
            RoundInput::self_draw(Wind::East, 2).with_hand_types(vec![HandType::RedDragon]);
        assert_eq!(
            state.record_round(&input, 2_000).err(),
            Some(GameError::InvalidInput(RoundError::HandTypeDisabled(HandType::RedDragon)))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_enabled_hand_type_recorded() {
        let settings = GameSettings {
            enable_honor_tiles: true,
            ..GameSettings::default()
        };
        let mut state = GameState::new(&["A", "B", "C", "D"], settings, 1_000);
        let input = RoundInput::self_draw(Wind::East, 2)
            .with_hand_types(vec![HandType::RedDragon, HandType::AllPungs]);
        let round = state.record_round(&input, 2_000).unwrap();
        assert_eq!(round.hand_types().len(), 2);
    }

    #[test]
    fn test_draw_records_dealer_as_winner() {
        let mut state = game();
        state.record_round(&RoundInput::discard(Wind::South, Wind::East, 1), 2_000).unwrap();
        let round = state.record_round(&RoundInput::draw(), 3_000).unwrap();
        assert_eq!(*round.winner_position(), Wind::South);
        assert!(*round.is_dealer_win());
        assert!(round.score_changes().is_empty());
    }
}
