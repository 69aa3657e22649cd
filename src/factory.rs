//! Piece generation
//!
//! The game asks a [`PieceSource`] for a new piece every time it enters the
//! spawn phase. [`DicePieceFactory`] rolls dice from a seeded ChaCha stream so
//! a seed reproduces a whole game; [`PieceQueue`] hands out pieces supplied
//! from outside.

use crate::die::{BLACK_DIE_SIDES, Die, DieColor};
use crate::mode::{GameMode, ModeConfig};
use crate::piece::Piece;
use crate::shape::ShapeKind;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// What the game knows when it requests a piece
#[derive(Debug, Clone)]
pub struct SpawnContext {
    pub mode: GameMode,
    pub config: ModeConfig,
    /// Extra wild chance granted by active boosters
    pub wild_chance_bonus: f64,
}

impl SpawnContext {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            config: mode.config(),
            wild_chance_bonus: 0.0,
        }
    }

    pub fn wild_chance(&self) -> f64 {
        (self.config.wild_chance + self.wild_chance_bonus).clamp(0.0, 1.0)
    }
}

/// Supplier of new pieces. Returning `None` means no piece is ready yet;
/// the game re-requests after its spawn grace window.
pub trait PieceSource {
    fn spawn_piece(&mut self, ctx: &SpawnContext) -> Option<Piece>;
}

/// Seeded random piece generator
#[derive(Debug, Clone)]
pub struct DicePieceFactory {
    rng: ChaCha8Rng,
    next_id: u32,
}

impl Default for DicePieceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DicePieceFactory {
    /// Create a factory with a random seed
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Roll one die from the mode's distribution
    pub fn roll_die(&mut self, ctx: &SpawnContext) -> Die {
        let config = &ctx.config;
        let id = self.allocate_id();
        let color = config
            .colors
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(DieColor::Red);

        if self.rng.gen_bool(config.black_die_chance.clamp(0.0, 1.0)) {
            let face = self.rng.gen_range(1..=BLACK_DIE_SIDES);
            return Die::black(face, color).with_id(id);
        }

        let sides = config.dice_types.choose(&mut self.rng).copied().unwrap_or(6);
        let face = self.rng.gen_range(1..=sides);
        let is_wild = self.rng.gen_bool(ctx.wild_chance());
        Die {
            id,
            sides,
            face,
            color,
            is_wild,
            is_black: false,
        }
    }

    /// Roll a shape allowed by the mode, then a die for each of its cells
    pub fn next_piece(&mut self, ctx: &SpawnContext) -> Piece {
        let shapes = ShapeKind::up_to(ctx.config.max_piece_size);
        let shape = shapes.choose(&mut self.rng).copied().unwrap_or(ShapeKind::Mono);
        let dice: Vec<Die> = (0..shape.cell_count()).map(|_| self.roll_die(ctx)).collect();
        let mut dice = dice.into_iter();
        Piece::new(shape, |_| dice.next().unwrap_or_else(|| Die::wild(DieColor::Red)))
    }
}

impl PieceSource for DicePieceFactory {
    fn spawn_piece(&mut self, ctx: &SpawnContext) -> Option<Piece> {
        Some(self.next_piece(ctx))
    }
}

/// Pieces pushed in by an external collaborator, handed out in order
#[derive(Debug, Clone, Default)]
pub struct PieceQueue {
    queue: VecDeque<Piece>,
}

impl PieceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, piece: Piece) {
        self.queue.push_back(piece);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl FromIterator<Piece> for PieceQueue {
    fn from_iter<I: IntoIterator<Item = Piece>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}

impl PieceSource for PieceQueue {
    fn spawn_piece(&mut self, _ctx: &SpawnContext) -> Option<Piece> {
        self.queue.pop_front()
    }
}
