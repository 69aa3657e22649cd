//! DICEFALL - falling dice, matching faces
//!
//! Engine for a falling-block puzzle where every block is a die. Pieces of
//! dice drop onto a 10×20 grid; orthogonally connected dice showing the same
//! face (wild dice match anything) clear in groups of three or more, larger
//! groups trigger bigger effects, and the grid settles and cascades.
//!
//! The engine is headless and deterministic for a given piece seed. Drive it
//! with [`Game::update`] and [`Game::process_command`], and read what
//! happened from [`Game::drain_events`].

pub mod booster;
pub mod cascade;
pub mod die;
pub mod error;
pub mod events;
pub mod factory;
pub mod game;
pub mod grid;
pub mod kicks;
pub mod match_group;
pub mod matching;
pub mod mode;
pub mod piece;
pub mod score;
pub mod settings;
pub mod shape;

pub use booster::{BoosterKind, BoosterRegistry, ChainBonusMode, ColorBooster};
pub use die::{Die, DieColor};
pub use error::{EngineError, EngineResult};
pub use events::GameEvent;
pub use factory::{DicePieceFactory, PieceQueue, PieceSource, SpawnContext};
pub use game::{Command, Game, GameStatus, Phase};
pub use grid::{GRID_HEIGHT, GRID_WIDTH, Grid, Position};
pub use match_group::{MatchGroup, SpecialEffect};
pub use matching::MatchDetector;
pub use mode::{GameMode, ModeConfig};
pub use piece::Piece;
pub use score::{ScoreBreakdown, ScoreManager};
pub use settings::Settings;
pub use shape::{Rotation, ShapeKind};
