//! Strictly Mahjong - command-line scorekeeper
//!
//! Every command loads the saved game, applies one operation and exits.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Parser;
use cli::{Cli, Command};
use strictly_mahjong::{
    AppConfig, GameSession, GameSettings, GameState, GameStatistics, PartialSettings, Round,
    RoundInput, SqliteStore, Wind, format_date_time, format_number, format_percentage,
    format_score,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(db_path) = cli.db_path {
        config = config.with_db_path(db_path);
    }
    debug!(?config, "Configuration resolved");

    let store = SqliteStore::open(config.db_path().clone())
        .with_context(|| format!("Failed to open database '{}'", config.db_path()))?;
    let mut session = GameSession::new(store);
    session.load();

    match cli.command {
        Command::New { names, settings } => {
            let names = if names.is_empty() {
                config.players().clone()
            } else {
                names
            };
            let overrides = merge_overrides(*config.settings(), settings.into());
            let state = session.start_game(&names, Some(overrides));
            info!(game_id = %state.game_id(), "Started from CLI");
            print_game(state);
        }
        Command::SelfDraw { winner, tai, hands } => {
            let input = RoundInput::self_draw(winner, tai).with_hand_types(hands);
            record(&mut session, input)?;
        }
        Command::Discard {
            winner,
            loser,
            tai,
            hands,
        } => {
            let input = RoundInput::discard(winner, loser, tai).with_hand_types(hands);
            record(&mut session, input)?;
        }
        Command::Draw => record(&mut session, RoundInput::draw())?,
        Command::Delete { round_id } => {
            let removed = session.delete_round(&round_id)?;
            println!("Removed {} round(s).", removed.len());
            print_current(&session)?;
        }
        Command::Recalc => {
            session.recalculate_scores()?;
            print_current(&session)?;
        }
        Command::End => {
            if !session.end_game() {
                bail!("No active game to end");
            }
            print_current(&session)?;
            if let Some(stats) = session.statistics() {
                print_statistics(&stats);
            }
        }
        Command::Show => print_current(&session)?,
        Command::Stats => match session.statistics() {
            Some(stats) => print_statistics(&stats),
            None => bail!("No game loaded"),
        },
        Command::History => {
            let history = session.history();
            if history.is_empty() {
                println!("No completed games.");
            }
            for game in &history {
                print_summary(game);
            }
        }
        Command::Settings { settings } => {
            let overrides = PartialSettings::from(settings);
            if !overrides.is_empty() {
                let updated = overrides.merge_over(session.default_settings());
                session.save_settings(updated);
            }
            print_settings(session.default_settings());
        }
        Command::Clear { history } => {
            session.clear();
            if history {
                session.clear_history();
            }
            println!("Cleared.");
        }
    }

    Ok(())
}

/// Config-file overrides, then command-line overrides on top.
fn merge_overrides(config: PartialSettings, cli: PartialSettings) -> PartialSettings {
    PartialSettings {
        base_point: cli.base_point.or(config.base_point),
        base_multiplier: cli.base_multiplier.or(config.base_multiplier),
        starting_score: cli.starting_score.or(config.starting_score),
        enable_continuous_dealer: cli
            .enable_continuous_dealer
            .or(config.enable_continuous_dealer),
        enable_flower_tiles: cli.enable_flower_tiles.or(config.enable_flower_tiles),
        enable_honor_tiles: cli.enable_honor_tiles.or(config.enable_honor_tiles),
        enable_liu_liu: cli.enable_liu_liu.or(config.enable_liu_liu),
    }
}

fn record(session: &mut GameSession<SqliteStore>, input: RoundInput) -> Result<()> {
    let round = session.add_round(input)?;
    print_round(&round);
    print_current(session)
}

fn print_current(session: &GameSession<SqliteStore>) -> Result<()> {
    match session.state() {
        Some(state) => {
            print_game(state);
            Ok(())
        }
        None => bail!("No game loaded"),
    }
}

fn print_game(state: &GameState) {
    let status = if *state.is_active() { "in progress" } else { "ended" };
    println!(
        "{} ({}), started {}",
        state.game_id(),
        status,
        format_date_time(*state.start_time(), &Local)
    );
    println!(
        "Round {}  dealer {} {}  streak {}",
        state.current_round_number(),
        state.current_dealer().glyph(),
        state.current_dealer(),
        state.dealer_win_count()
    );
    for player in state.players() {
        let dealer = if player.position == *state.current_dealer() {
            "*"
        } else {
            " "
        };
        println!(
            "{} {} {:<5} {:<16} {:>10}",
            dealer,
            player.position.glyph(),
            player.position,
            player.name,
            format_number(player.total_score)
        );
    }
    for round in state.rounds() {
        print_round(round);
    }
}

fn print_round(round: &Round) {
    let changes: Vec<String> = Wind::ALL
        .iter()
        .map(|&w| format!("{} {}", w.glyph(), format_score(round.change_for(w))))
        .collect();
    let loser = round
        .loser_position()
        .as_ref()
        .map(|l| format!(" off {}", l))
        .unwrap_or_default();
    println!(
        "  #{:<3} [{}] {} {}{} {} tai  {}",
        round.round_number(),
        round.id(),
        round.winner_position(),
        round.win_type(),
        loser,
        round.tai(),
        changes.join("  ")
    );
}

fn print_summary(state: &GameState) {
    let stats = GameStatistics::compute(state);
    let leader = stats
        .leader()
        .map(|p| format!("{} ({})", p.name(), format_score(*p.final_score())))
        .unwrap_or_default();
    println!(
        "{}  {}  {} rounds  leader {}",
        format_date_time(*state.start_time(), &Local),
        state.game_id(),
        stats.total_rounds(),
        leader
    );
}

fn print_statistics(stats: &GameStatistics) {
    println!(
        "{} rounds ({} drawn), max tai {}, average tai {:.1}",
        stats.total_rounds(),
        stats.drawn_rounds(),
        stats.max_tai(),
        stats.average_tai()
    );
    for (rank, p) in stats.ranked().iter().enumerate() {
        println!(
            "{}. {:<16} {:>10}  wins {} (self {} / discard {})  dealt-in {}  win rate {}  avg {:.1}  best {}",
            rank + 1,
            p.name(),
            format_number(*p.final_score()),
            p.total_wins(),
            p.self_draw_wins(),
            p.discard_wins(),
            p.total_loses(),
            format_percentage(*p.win_rate(), 1),
            p.average_win_points(),
            format_score(*p.max_win_points())
        );
    }
}

fn print_settings(settings: &GameSettings) {
    println!("base point          {}", settings.base_point);
    println!("base multiplier     {}", settings.base_multiplier);
    println!("starting score      {}", settings.starting_score);
    println!("continuous dealer   {}", settings.enable_continuous_dealer);
    println!("flower tiles        {}", settings.enable_flower_tiles);
    println!("honor tiles         {}", settings.enable_honor_tiles);
    println!("liu liu             {}", settings.enable_liu_liu);
}
