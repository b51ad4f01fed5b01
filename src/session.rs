//! Game session controller.
//!
//! A [`GameSession`] owns the current [`GameState`] explicitly and writes a
//! snapshot to its store after every mutation. Persistence failures are
//! logged and never undo or block the in-memory change.

use crate::games::mahjong::invariants::{InvariantSet, MahjongInvariants};
use crate::games::mahjong::{
    GameError, GameSettings, GameState, GameStatistics, PartialSettings, Round, RoundInput,
    history_from_snapshot, settings_from_snapshot,
};
use crate::storage::{
    CURRENT_GAME_KEY, GAME_HISTORY_KEY, GAME_SETTINGS_KEY, JsonStorage, KeyValueStore,
};
use tracing::{debug, error, info, instrument, warn};

/// Milliseconds since the Unix epoch.
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Scorekeeping session for one table.
#[derive(Debug)]
pub struct GameSession<S> {
    storage: JsonStorage<S>,
    state: Option<GameState>,
    default_settings: GameSettings,
}

impl<S: KeyValueStore> GameSession<S> {
    /// Creates a session over `store`, reading saved default settings.
    ///
    /// No game is loaded; call [`GameSession::load`] to resume one.
    #[instrument(skip(store))]
    pub fn new(store: S) -> Self {
        let storage = JsonStorage::new(store);
        let default_settings = storage
            .load_raw(GAME_SETTINGS_KEY)
            .and_then(|json| match settings_from_snapshot(&json) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    error!(error = %e, "Ignoring unreadable saved settings");
                    None
                }
            })
            .unwrap_or_default();

        info!(?default_settings, "Creating game session");
        Self {
            storage,
            state: None,
            default_settings,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        self.storage.store()
    }

    /// The current game, active or ended.
    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// True when a game is loaded and has not ended.
    pub fn is_active(&self) -> bool {
        self.state.as_ref().is_some_and(|s| *s.is_active())
    }

    /// Settings new games start from.
    pub fn default_settings(&self) -> &GameSettings {
        &self.default_settings
    }

    /// Replaces and persists the settings new games start from.
    ///
    /// The game in progress keeps the settings it was started with.
    #[instrument(skip(self))]
    pub fn save_settings(&mut self, settings: GameSettings) {
        self.default_settings = settings;
        self.storage.save(GAME_SETTINGS_KEY, &settings);
    }

    /// Starts a new game, replacing any loaded one.
    ///
    /// `settings` overrides are merged over the session's default settings.
    #[instrument(skip(self, names))]
    pub fn start_game<N: AsRef<str>>(
        &mut self,
        names: &[N],
        settings: Option<PartialSettings>,
    ) -> &GameState {
        let settings = settings
            .unwrap_or_default()
            .merge_over(&self.default_settings);

        if let Some(previous) = &self.state {
            debug!(game_id = %previous.game_id(), "Replacing loaded game");
        }

        let state = GameState::new(names, settings, now_ms());
        info!(game_id = %state.game_id(), "Game started");
        self.persist(&state);
        self.state.insert(state)
    }

    /// Records a round in the active game.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoActiveGame`] without a game in progress, or
    /// [`GameError::InvalidInput`] for a malformed submission. Either way the
    /// state is unchanged.
    #[instrument(skip(self), fields(round = %input))]
    pub fn add_round(&mut self, input: RoundInput) -> Result<Round, GameError> {
        let state = self.active_state_mut()?;

        let round = state
            .record_round(&input, now_ms())
            .map_err(|e| {
                warn!(error = %e, "Round rejected");
                e
            })?
            .clone();

        info!(
            round_id = %round.id(),
            next_dealer = %round.next_dealer(),
            streak = round.dealer_win_count(),
            "Round added"
        );
        self.commit();
        Ok(round)
    }

    /// Removes a round and every round after it, then rebuilds scores and
    /// the dealer seat from the remaining history.
    ///
    /// Returns the removed rounds, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoActiveGame`] without a game in progress, or
    /// [`GameError::RoundNotFound`] for an unknown identifier.
    #[instrument(skip(self))]
    pub fn delete_round(&mut self, round_id: &str) -> Result<Vec<Round>, GameError> {
        let state = self.active_state_mut()?;

        let removed = state.retract_round(round_id).map_err(|e| {
            warn!(error = %e, "Round deletion rejected");
            e
        })?;

        info!(removed = removed.len(), "Rounds deleted");
        self.commit();
        Ok(removed)
    }

    /// Rebuilds every player's total from the round log.
    ///
    /// Works on ended games too, as a consistency repair.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoActiveGame`] if no game is loaded.
    #[instrument(skip(self))]
    pub fn recalculate_scores(&mut self) -> Result<(), GameError> {
        let Some(state) = self.state.as_mut() else {
            warn!("No game loaded, nothing to recalculate");
            return Err(GameError::NoActiveGame);
        };
        state.recalculate_scores();
        self.commit();
        Ok(())
    }

    /// Ends the active game and archives it.
    ///
    /// Returns false (a no-op) if no game is in progress.
    #[instrument(skip(self))]
    pub fn end_game(&mut self) -> bool {
        let Some(state) = self.state.as_mut() else {
            debug!("No game to end");
            return false;
        };
        if !state.end() {
            debug!("Game already ended");
            return false;
        }

        let ended = state.clone();
        self.persist(&ended);

        let mut history = self.history();
        history.retain(|g| g.game_id() != ended.game_id());
        history.push(ended);
        self.storage.save(GAME_HISTORY_KEY, &history);
        info!(archived = history.len(), "Game archived");
        true
    }

    /// Loads the saved game, migrating older snapshots.
    ///
    /// Returns the loaded game, or `None` if nothing usable was saved (the
    /// in-memory game is then left as it was).
    #[instrument(skip(self))]
    pub fn load(&mut self) -> Option<&GameState> {
        let json = self.storage.load_raw(CURRENT_GAME_KEY)?;
        match GameState::from_snapshot(&json) {
            Ok(state) => {
                info!(
                    game_id = %state.game_id(),
                    rounds = state.rounds().len(),
                    active = state.is_active(),
                    "Game loaded"
                );
                Some(&*self.state.insert(state))
            }
            Err(e) => {
                error!(error = %e, "Saved game is unreadable");
                None
            }
        }
    }

    /// Forgets the current game and deletes its snapshot.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.state = None;
        self.storage.remove(CURRENT_GAME_KEY);
        info!("Game cleared");
    }

    /// Completed games, oldest first.
    #[instrument(skip(self))]
    pub fn history(&self) -> Vec<GameState> {
        let Some(json) = self.storage.load_raw(GAME_HISTORY_KEY) else {
            return Vec::new();
        };
        history_from_snapshot(&json).unwrap_or_else(|e| {
            error!(error = %e, "Game history is unreadable");
            Vec::new()
        })
    }

    /// Deletes the archive of completed games.
    #[instrument(skip(self))]
    pub fn clear_history(&mut self) {
        self.storage.remove(GAME_HISTORY_KEY);
        info!("Game history cleared");
    }

    /// Statistics for the loaded game.
    #[instrument(skip(self))]
    pub fn statistics(&self) -> Option<GameStatistics> {
        self.state.as_ref().map(GameStatistics::compute)
    }

    fn active_state_mut(&mut self) -> Result<&mut GameState, GameError> {
        match self.state.as_mut() {
            Some(state) if *state.is_active() => Ok(state),
            _ => {
                warn!("No active game");
                Err(GameError::NoActiveGame)
            }
        }
    }

    /// Verifies invariants and persists the current state.
    fn commit(&self) {
        let Some(state) = &self.state else {
            return;
        };
        if let Err(violations) = MahjongInvariants::check_all(state) {
            for violation in &violations {
                error!(description = %violation.description, "Invariant violated");
            }
        }
        self.persist(state);
    }

    fn persist(&self, state: &GameState) {
        match state.to_snapshot() {
            Ok(json) => {
                self.storage.save_raw(CURRENT_GAME_KEY, &json);
            }
            Err(e) => error!(error = %e, "Failed to encode game snapshot"),
        }
    }
}
