//! Per-player and per-game statistics derived from the round log.

use super::types::{GameState, WinType, Wind};
use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, instrument};

/// Statistics for one seat.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    position: Wind,
    name: String,
    total_wins: u32,
    self_draw_wins: u32,
    discard_wins: u32,
    /// Times this seat's discard paid for someone else's win.
    total_loses: u32,
    /// Wins divided by rounds played, 0.0–1.0.
    win_rate: f64,
    average_win_points: f64,
    max_win_points: i64,
    final_score: i64,
}

/// Statistics for a whole game.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GameStatistics {
    /// One entry per wind, in rotation order.
    players: Vec<PlayerStatistics>,
    total_rounds: usize,
    drawn_rounds: usize,
    max_tai: i64,
    average_tai: f64,
}

impl GameStatistics {
    /// Computes statistics for `state`.
    #[instrument(skip(state), fields(game_id = %state.game_id()))]
    pub fn compute(state: &GameState) -> Self {
        let rounds = state.rounds();

        let players = Wind::ALL
            .iter()
            .map(|&position| {
                let name = state
                    .player(position)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                let final_score = state.player(position).map_or(0, |p| p.total_score);

                let wins: Vec<_> = rounds
                    .iter()
                    .filter(|r| *r.win_type() != WinType::Draw && *r.winner_position() == position)
                    .collect();
                let count = |win_type: WinType| {
                    wins.iter().filter(|r| *r.win_type() == win_type).count() as u32
                };
                let win_points: Vec<i64> = wins.iter().map(|r| r.change_for(position)).collect();
                let total_wins = wins.len() as u32;

                PlayerStatistics {
                    position,
                    name,
                    total_wins,
                    self_draw_wins: count(WinType::SelfDraw),
                    discard_wins: count(WinType::Discard),
                    total_loses: rounds
                        .iter()
                        .filter(|r| *r.loser_position() == Some(position))
                        .count() as u32,
                    win_rate: ratio(f64::from(total_wins), rounds.len()),
                    average_win_points: ratio(
                        win_points.iter().map(|&p| p as f64).sum(),
                        win_points.len(),
                    ),
                    max_win_points: win_points.iter().copied().max().unwrap_or(0).max(0),
                    final_score,
                }
            })
            .collect();

        let total_tai: f64 = rounds.iter().map(|r| *r.tai() as f64).sum();
        let stats = Self {
            players,
            total_rounds: rounds.len(),
            drawn_rounds: rounds
                .iter()
                .filter(|r| *r.win_type() == WinType::Draw)
                .count(),
            max_tai: rounds.iter().map(|r| *r.tai()).max().unwrap_or(0).max(0),
            average_tai: ratio(total_tai, rounds.len()),
        };
        debug!(total_rounds = stats.total_rounds, "Statistics computed");
        stats
    }

    /// Players ordered by final score, highest first. Ties keep seat order.
    pub fn ranked(&self) -> Vec<&PlayerStatistics> {
        let mut ranked: Vec<_> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.final_score.cmp(&a.final_score));
        ranked
    }

    /// The player with the highest final score.
    pub fn leader(&self) -> Option<&PlayerStatistics> {
        self.ranked().into_iter().next()
    }

    /// Statistics for one seat.
    pub fn player(&self, position: Wind) -> Option<&PlayerStatistics> {
        self.players.iter().find(|p| p.position == position)
    }
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::mahjong::{GameSettings, RoundInput};

    #[test]
    fn test_empty_game_has_zeroed_statistics() {
        let state = GameState::new(&["A", "B", "C", "D"], GameSettings::default(), 0);
        let stats = GameStatistics::compute(&state);
        assert_eq!(*stats.total_rounds(), 0);
        assert_eq!(*stats.average_tai(), 0.0);
        assert_eq!(stats.players().len(), 4);
        assert_eq!(*stats.players()[0].win_rate(), 0.0);
    }

    #[test]
    fn test_statistics_track_wins_and_losses() {
        let mut state = GameState::new(&["A", "B", "C", "D"], GameSettings::default(), 0);
        state.record_round(&RoundInput::discard(Wind::South, Wind::East, 3), 1).unwrap();
        state.record_round(&RoundInput::self_draw(Wind::South, 1), 2).unwrap();
        state.record_round(&RoundInput::draw(), 3).unwrap();
        state.record_round(&RoundInput::discard(Wind::North, Wind::East, 8), 4).unwrap();

        let stats = GameStatistics::compute(&state);
        let south = stats.player(Wind::South).unwrap();
        assert_eq!(*south.total_wins(), 2);
        assert_eq!(*south.self_draw_wins(), 1);
        assert_eq!(*south.discard_wins(), 1);
        assert_eq!(*south.max_win_points(), 90);
        assert_eq!(*south.average_win_points(), 70.0);
        assert_eq!(*south.win_rate(), 0.5);

        let east = stats.player(Wind::East).unwrap();
        assert_eq!(*east.total_loses(), 2);
        assert_eq!(*east.total_wins(), 0);

        assert_eq!(*stats.drawn_rounds(), 1);
        assert_eq!(*stats.max_tai(), 8);
        assert_eq!(*stats.average_tai(), 3.0);
        assert_eq!(stats.leader().map(|p| *p.position()), Some(Wind::South));
    }
}
