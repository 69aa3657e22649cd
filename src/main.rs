//! DICEFALL - headless autoplay runner
//!
//! Plays random placements against the engine and reports the score.

use clap::Parser;
use dicefall::{
    Command, EngineResult, GRID_WIDTH, Game, GameEvent, GameMode, ScoreBreakdown, Settings,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Simulated frame time
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Hard ceiling on frames so a stuck game still terminates
const MAX_FRAMES: u64 = 5_000_000;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "dicefall")]
#[command(about = "Autoplay a falling-dice puzzle game and report the score")]
#[command(version)]
struct Args {
    /// Game mode: easy, medium, hard, expert or zen
    #[arg(short, long)]
    mode: Option<GameMode>,

    /// Seed for piece generation and autoplay moves
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of turns to play before stopping
    #[arg(short, long, default_value = "200")]
    turns: usize,

    /// Settings file to use instead of the one in the config directory
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Print the score history as JSON
    #[arg(long)]
    json: bool,
}

/// Result of one autoplay run
#[derive(Debug, Serialize)]
struct Summary<'a> {
    mode: GameMode,
    seed: u64,
    score: u64,
    turns: usize,
    pieces: u32,
    game_over: bool,
    history: &'a [ScoreBreakdown],
}

/// Get the dicefall temp directory, creating it if needed
fn dicefall_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("dicefall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> EngineResult<()> {
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::from_path(path)?,
        None => Settings::load(),
    };
    if let Some(mode) = args.mode {
        settings.game.mode = mode;
    }
    let seed = args.seed.or(settings.game.seed).unwrap_or_else(rand::random);
    settings.game.seed = Some(seed);

    // Setup tracing to log file
    let session_id: u32 = rand::random();
    let log_dir = dicefall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter)),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "DICEFALL starting up, session={:08x}, seed={}, log={}",
        session_id,
        seed,
        log_dir.join(&log_file).display()
    );

    let mode = settings.game.mode;
    let mut game = Game::from_settings(settings);
    let mut rng = ChaCha8Rng::seed_from_u64(seed.rotate_left(32));
    let turns = autoplay(&mut game, &mut rng, args.turns);

    let summary = Summary {
        mode,
        seed,
        score: game.score(),
        turns,
        pieces: game.pieces_locked(),
        game_over: game.is_game_over(),
        history: game.scores().history(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Run the game until `max_turns` turns are scored or it ends.
/// Returns the number of turns played.
fn autoplay(game: &mut Game, rng: &mut ChaCha8Rng, max_turns: usize) -> usize {
    let mut turns = 0;
    for _ in 0..MAX_FRAMES {
        if game.is_game_over() || turns >= max_turns {
            break;
        }
        if game.is_input_enabled() {
            place_randomly(game, rng);
        }
        game.update(FRAME_DURATION);
        turns += game
            .drain_events()
            .iter()
            .filter(|event| matches!(event, GameEvent::ScoreDelta(_)))
            .count();
    }
    turns
}

/// Rotate the current piece a random number of times, slide it toward a
/// random column and hard drop it
fn place_randomly(game: &mut Game, rng: &mut ChaCha8Rng) {
    for _ in 0..rng.gen_range(0..4) {
        game.process_command(Command::Rotate);
    }

    let target = rng.gen_range(0..GRID_WIDTH as i32);
    for _ in 0..GRID_WIDTH {
        let Some(x) = game.current_piece().map(|piece| piece.x) else {
            return;
        };
        let step = match x.cmp(&target) {
            std::cmp::Ordering::Less => Command::MoveRight,
            std::cmp::Ordering::Greater => Command::MoveLeft,
            std::cmp::Ordering::Equal => break,
        };
        game.process_command(step);
        if game.current_piece().map(|piece| piece.x) == Some(x) {
            break; // against a wall or another die
        }
    }

    game.process_command(Command::HardDrop);
}

fn print_summary(summary: &Summary<'_>) {
    println!("Mode: {} | Seed: {}", summary.mode.name(), summary.seed);
    println!("Final Score: {}", summary.score);
    println!("Turns: {} | Pieces: {}", summary.turns, summary.pieces);

    let scoring: Vec<&ScoreBreakdown> = summary
        .history
        .iter()
        .filter(|turn| turn.total_score > 0)
        .collect();
    if let Some(best) = scoring.iter().max_by_key(|turn| turn.total_score) {
        println!(
            "Best Turn: {} ({} groups, {} cascades)",
            best.total_score, best.groups, best.cascades
        );
    }
    println!("Scoring Turns: {}", scoring.len());
    if summary.game_over {
        println!("Game over.");
    }
}
