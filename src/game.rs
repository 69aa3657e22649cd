//! Core game state and the phase loop
//!
//! A turn cycles through `Spawn → DropControl → Lock → Match`, then loops
//! `ClearMatch → Cascade → Match` until a scan finds nothing, and returns to
//! `Spawn`. [`Game::update`] runs exactly one phase step per call.

use crate::cascade::CascadeManager;
use crate::events::GameEvent;
use crate::factory::{DicePieceFactory, PieceSource, SpawnContext};
use crate::grid::{Grid, Position};
use crate::match_group::{MatchGroup, centroid_of};
use crate::matching::MatchDetector;
use crate::mode::GameMode;
use crate::piece::Piece;
use crate::score::ScoreManager;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lock resets allowed per piece by moving or rotating on the ground
const MAX_LOCK_RESETS: u8 = 15;

/// Phase of the turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Spawn,
    DropControl,
    Lock,
    Match,
    ClearMatch,
    Cascade,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Spawn => "spawn",
            Phase::DropControl => "drop_control",
            Phase::Lock => "lock",
            Phase::Match => "match",
            Phase::ClearMatch => "clear_match",
            Phase::Cascade => "cascade",
        };
        f.write_str(name)
    }
}

/// Game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Running,
    Paused,
    GameOver,
}

/// Player commands the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    HardDrop,
    Lock,
    Pause,
}

/// The main game struct
pub struct Game {
    mode: GameMode,
    settings: Settings,
    grid: Grid,
    current_piece: Option<Piece>,
    source: Box<dyn PieceSource>,
    detector: MatchDetector,
    cascade: CascadeManager,
    scores: ScoreManager,
    phase: Phase,
    status: GameStatus,
    /// Time spent in the current phase, checked against the phase timeout
    phase_elapsed: Duration,
    /// Time since the last spawn request, `None` until one is made
    spawn_wait: Option<Duration>,
    /// Time since the piece last fell a row
    fall_timer: Duration,
    /// Lock delay timer (Some when the piece is touching ground)
    lock_timer: Option<Duration>,
    lock_resets: u8,
    /// Groups found by the last scan, cleared by the next step
    pending_matches: Vec<MatchGroup>,
    /// Gravity moved dice and the game waits for `notify_settled`
    awaiting_settle: bool,
    pieces_locked: u32,
    events: Vec<GameEvent>,
}

impl Game {
    /// Create a game drawing pieces from `source`
    pub fn new(mode: GameMode, settings: Settings, source: Box<dyn PieceSource>) -> Self {
        info!(%mode, "starting game");
        let cascade = CascadeManager::new(settings.cascade.max_cascades);
        let scores = ScoreManager::new(settings.cascade.chain_bonus_mode);
        Self {
            mode,
            settings,
            grid: Grid::new(),
            current_piece: None,
            source,
            detector: MatchDetector::new(),
            cascade,
            scores,
            phase: Phase::Spawn,
            status: GameStatus::Running,
            phase_elapsed: Duration::ZERO,
            spawn_wait: None,
            fall_timer: Duration::ZERO,
            lock_timer: None,
            lock_resets: 0,
            pending_matches: Vec::new(),
            awaiting_settle: false,
            pieces_locked: 0,
            events: Vec::new(),
        }
    }

    /// Create a game with default settings and a seeded piece factory
    pub fn with_seed(mode: GameMode, seed: u64) -> Self {
        Self::new(
            mode,
            Settings::default(),
            Box::new(DicePieceFactory::with_seed(seed)),
        )
    }

    /// Create a game from settings alone: mode and seed come from the
    /// `[game]` section, a missing seed means a random one
    pub fn from_settings(settings: Settings) -> Self {
        let mode = settings.game.mode;
        let factory = match settings.game.seed {
            Some(seed) => DicePieceFactory::with_seed(seed),
            None => DicePieceFactory::new(),
        };
        Self::new(mode, settings, Box::new(factory))
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for setting up puzzles and scenarios
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current_piece.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn scores(&self) -> &ScoreManager {
        &self.scores
    }

    pub fn score(&self) -> u64 {
        self.scores.total()
    }

    pub fn cascade_index(&self) -> u32 {
        self.cascade.cascade_index()
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    /// Whether movement commands are accepted right now
    pub fn is_input_enabled(&self) -> bool {
        self.status == GameStatus::Running
            && self.phase == Phase::DropControl
            && self.current_piece.is_some()
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Process a command
    pub fn process_command(&mut self, command: Command) {
        match self.status {
            GameStatus::GameOver => {}
            GameStatus::Paused => {
                if command == Command::Pause {
                    debug!("resumed");
                    self.status = GameStatus::Running;
                }
            }
            GameStatus::Running => {
                if command == Command::Pause {
                    debug!("paused");
                    self.status = GameStatus::Paused;
                    return;
                }
                if !self.is_input_enabled() {
                    return;
                }
                match command {
                    Command::MoveLeft => self.shift(|piece, grid| piece.move_left(grid)),
                    Command::MoveRight => self.shift(|piece, grid| piece.move_right(grid)),
                    Command::Rotate => self.shift(|piece, grid| piece.rotate(grid)),
                    Command::MoveDown => self.soft_drop(),
                    Command::HardDrop => self.hard_drop(),
                    Command::Lock => self.lock_piece(),
                    Command::Pause => {}
                }
            }
        }
    }

    /// Advance the game by `dt` and run one phase step
    pub fn update(&mut self, dt: Duration) {
        if self.status != GameStatus::Running {
            return;
        }

        for expired in self.scores.boosters_mut().tick(dt) {
            debug!(color = %expired.color, "booster expired");
            self.events.push(GameEvent::BoosterExpired {
                color: expired.color,
            });
        }

        // The drop phase always progresses through auto-fall
        if self.phase != Phase::DropControl {
            self.phase_elapsed += dt;
            if self.phase_elapsed >= self.settings.timing.phase_timeout() {
                self.phase_timed_out();
                return;
            }
        }

        match self.phase {
            Phase::Spawn => self.step_spawn(dt),
            Phase::DropControl => self.step_drop(dt),
            Phase::Lock => self.lock_piece(),
            Phase::Match => self.step_match(),
            Phase::ClearMatch => self.step_clear(),
            Phase::Cascade => self.step_cascade(),
        }
    }

    /// Abandon whatever is in progress and go straight back to spawning.
    /// The unfinished turn is not scored.
    pub fn force_spawn(&mut self) {
        if self.status == GameStatus::GameOver {
            return;
        }
        self.current_piece = None;
        self.pending_matches.clear();
        self.awaiting_settle = false;
        self.cascade.reset();
        self.scores.abort_turn();
        self.set_phase(Phase::Spawn);
        self.phase_elapsed = Duration::ZERO;
        self.spawn_wait = None;
    }

    /// Tell the game that gravity animations have finished
    pub fn notify_settled(&mut self) {
        if self.phase == Phase::Cascade && self.awaiting_settle {
            self.awaiting_settle = false;
            self.advance_cascade();
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        debug!(%from, %to, "phase change");
        self.phase = to;
        self.phase_elapsed = Duration::ZERO;
        if to == Phase::Spawn {
            self.spawn_wait = None;
        }
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    fn phase_timed_out(&mut self) {
        let phase = self.phase;
        warn!(%phase, elapsed = ?self.phase_elapsed, "phase timed out, forcing spawn");
        self.events.push(GameEvent::PhaseTimeout { phase });
        self.force_spawn();
    }

    fn spawn_context(&self) -> SpawnContext {
        let mut ctx = SpawnContext::new(self.mode);
        ctx.wild_chance_bonus = self.scores.boosters().wild_chance_bonus();
        ctx
    }

    fn step_spawn(&mut self, dt: Duration) {
        let grace = self.settings.timing.spawn_grace();
        let request = match self.spawn_wait {
            None => {
                self.spawn_wait = Some(Duration::ZERO);
                true
            }
            Some(waited) => {
                let waited = waited + dt;
                if waited >= grace {
                    debug!(?waited, "no piece arrived, requesting again");
                    self.spawn_wait = Some(Duration::ZERO);
                    true
                } else {
                    self.spawn_wait = Some(waited);
                    false
                }
            }
        };
        if request {
            self.events.push(GameEvent::SpawnRequested);
        }

        let ctx = self.spawn_context();
        let Some(piece) = self.source.spawn_piece(&ctx) else {
            return;
        };
        debug!(shape = %piece.shape, x = piece.x, y = piece.y, "piece spawned");
        self.events.push(GameEvent::PieceSpawned { shape: piece.shape });
        self.current_piece = Some(piece);
        self.reset_piece_state();
        self.set_phase(Phase::DropControl);
    }

    /// Reset per-piece state
    fn reset_piece_state(&mut self) {
        self.fall_timer = Duration::ZERO;
        self.lock_timer = None;
        self.lock_resets = 0;
    }

    fn fall_interval(&self) -> Duration {
        let base = self.mode.config().fall_interval();
        let factor = self.scores.boosters().fall_speed_factor();
        if factor > 0.0 {
            Duration::from_secs_f64(base.as_secs_f64() / factor)
        } else {
            base
        }
    }

    fn lock_delay(&self) -> Duration {
        self.settings.timing.lock_delay() + self.scores.boosters().gravity_delay()
    }

    fn step_drop(&mut self, dt: Duration) {
        let fall_interval = self.fall_interval();
        let lock_delay = self.lock_delay();
        let Some(piece) = self.current_piece.as_mut() else {
            self.set_phase(Phase::Spawn);
            return;
        };

        let on_ground = self.grid.check_collision(piece, piece.x, piece.y + 1);
        if on_ground {
            // Start or check lock timer
            let held = self.lock_timer.map_or(Duration::ZERO, |t| t + dt);
            self.lock_timer = Some(held);
            if held >= lock_delay {
                self.set_phase(Phase::Lock);
            }
        } else {
            self.lock_timer = None;
            self.fall_timer += dt;
            if self.fall_timer >= fall_interval {
                piece.move_down(&self.grid);
                self.fall_timer = Duration::ZERO;
            }
        }
    }

    /// Move or rotate the piece, resetting a running lock delay on success
    fn shift(&mut self, apply: impl FnOnce(&mut Piece, &Grid) -> bool) {
        let Some(piece) = self.current_piece.as_mut() else {
            return;
        };
        if apply(piece, &self.grid) && self.lock_timer.is_some() && self.lock_resets < MAX_LOCK_RESETS
        {
            self.lock_timer = Some(Duration::ZERO);
            self.lock_resets += 1;
        }
    }

    fn soft_drop(&mut self) {
        let Some(piece) = self.current_piece.as_mut() else {
            return;
        };
        if piece.move_down(&self.grid) {
            self.fall_timer = Duration::ZERO;
            self.lock_timer = None;
        } else if self.lock_timer.is_none() {
            // Grounded: start the regular lock delay
            self.lock_timer = Some(Duration::ZERO);
        }
    }

    fn hard_drop(&mut self) {
        if let Some(piece) = self.current_piece.as_mut() {
            let distance = piece.hard_drop(&self.grid);
            debug!(distance, "hard drop");
        }
        self.lock_piece();
    }

    /// Lock the current piece into the grid and start matching
    fn lock_piece(&mut self) {
        let Some(mut piece) = self.current_piece.take() else {
            self.set_phase(Phase::Spawn);
            return;
        };
        // Commands lock straight from drop control
        self.set_phase(Phase::Lock);
        match self.grid.add_piece(&mut piece) {
            Ok(positions) => self.piece_placed(&positions),
            Err(e) => {
                debug!(error = %e, shape = %piece.shape, "piece could not be placed");
                self.placement_failed(piece);
            }
        }
    }

    fn piece_placed(&mut self, positions: &[Position]) {
        for &position in positions {
            if let Some(die) = self.grid.get(position.x, position.y) {
                self.events.push(GameEvent::DieLocked {
                    die_id: die.id,
                    position,
                });
            }
        }
        self.pieces_locked += 1;
        for expired in self.scores.boosters_mut().on_piece_locked() {
            debug!(color = %expired.color, "booster expired");
            self.events.push(GameEvent::BoosterExpired {
                color: expired.color,
            });
        }
        self.begin_turn();
    }

    fn begin_turn(&mut self) {
        self.scores.begin_turn();
        self.cascade.reset();
        self.pending_matches.clear();
        self.set_phase(Phase::Match);
    }

    /// Game-over modes end here. Zen trims the top of the grid and retries
    /// the piece from its spawn column, twice, before discarding it.
    fn placement_failed(&mut self, mut piece: Piece) {
        if self.mode.config().has_game_over {
            self.game_over();
            return;
        }

        let attempts = [
            self.settings.zen.first_clear_rows,
            self.settings.zen.second_clear_rows,
        ];
        for rows in attempts {
            let removed = self.grid.clear_top_rows(rows).len();
            self.grid.apply_gravity();
            warn!(rows, removed, "grid full, trimmed top rows");
            self.events.push(GameEvent::GridTrimmed { rows, removed });

            piece.reset_to_spawn();
            piece.hard_drop(&self.grid);
            if let Ok(positions) = self.grid.add_piece(&mut piece) {
                self.piece_placed(&positions);
                return;
            }
        }

        warn!(shape = %piece.shape, "piece discarded after trimming the grid");
        self.begin_turn();
    }

    fn step_match(&mut self) {
        let region = self.cascade.take_rescan_region();
        let groups = match region {
            Some(region) if self.settings.cascade.region_rescan && self.cascade.cascade_index() > 0 => {
                self.detector.detect_in_region(&self.grid, region)
            }
            _ => self.detector.detect_matches(&self.grid),
        };

        if groups.is_empty() {
            self.end_turn();
            return;
        }

        for group in &groups {
            debug!(
                value = group.matched_value(),
                size = group.size(),
                effect = ?group.effect(),
                "match found"
            );
            self.events.push(GameEvent::MatchFound {
                matched_value: group.matched_value(),
                size: group.size(),
                effect: group.effect(),
                center: group.centroid(),
                ultimate_combo: group.is_ultimate_combo(),
            });
        }
        self.pending_matches = groups;
        self.set_phase(Phase::ClearMatch);
    }

    fn step_clear(&mut self) {
        let groups = std::mem::take(&mut self.pending_matches);
        let chain_index = self.cascade.cascade_index();
        self.scores.record_matches(chain_index, &groups);

        let size_bonus = self.scores.boosters().size_bonus();
        let outcome = self.cascade.apply_clears(&mut self.grid, &groups, size_bonus);
        debug!(
            chain_index,
            groups = groups.len(),
            removed = outcome.removed.len(),
            "cleared matches"
        );

        for &position in &outcome.spawned_wilds {
            self.events.push(GameEvent::WildSpawned { position });
        }
        if chain_index >= 1 {
            let positions: Vec<Position> = groups
                .iter()
                .flat_map(|g| g.positions().iter().copied())
                .collect();
            self.events.push(GameEvent::CascadeStep {
                chain_index,
                center: centroid_of(&positions),
            });
        }
        self.set_phase(Phase::Cascade);
    }

    fn step_cascade(&mut self) {
        if self.awaiting_settle {
            return;
        }
        let moved = self.cascade.settle(&mut self.grid).len();
        if moved > 0 && self.settings.cascade.await_settle {
            debug!(moved, "waiting for dice to settle");
            self.awaiting_settle = true;
            return;
        }
        self.advance_cascade();
    }

    fn advance_cascade(&mut self) {
        if !self.cascade.advance() {
            warn!(
                limit = self.settings.cascade.max_cascades,
                "cascade limit reached, ending turn"
            );
            self.end_turn();
            return;
        }
        self.set_phase(Phase::Match);
    }

    /// Score the turn, activate earned boosters and check for game over
    fn end_turn(&mut self) {
        let (breakdown, activated) = self.scores.finish_turn();
        if breakdown.total_score > 0 {
            info!(
                score = breakdown.total_score,
                total = self.scores.total(),
                cascades = breakdown.cascades,
                "turn scored"
            );
        }
        self.events.push(GameEvent::ScoreDelta(breakdown));
        for booster in &activated {
            info!(color = %booster.color, kind = ?booster.kind, "booster activated");
            self.events.push(GameEvent::booster_activated(booster));
        }
        self.cascade.reset();

        if self.mode.config().has_game_over && self.grid.is_full() {
            self.game_over();
            return;
        }
        self.set_phase(Phase::Spawn);
    }

    fn game_over(&mut self) {
        info!(score = self.scores.total(), pieces = self.pieces_locked, "game over");
        self.status = GameStatus::GameOver;
        self.current_piece = None;
        self.pending_matches.clear();
        self.scores.abort_turn();
        self.events.push(GameEvent::GameOver {
            score: self.scores.total(),
        });
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::from_settings(Settings::default())
    }
}
