//! Polyomino shape definitions and rotation
//!
//! Every shape is stored as a square occupancy matrix, padded from its
//! bounding box and anchored at the top-left. Rotations are derived from the
//! base matrix by repeated 90° clockwise turns.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named shapes a piece can be cut from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Mono,   // single die
    Domino, // 1x2 bar
    I3,     // 1x3 bar
    V,      // small corner
    I,      // 1x4 bar
    O,      // 2x2 square
    T,
    L,
    J,
    S,
    Z,
    Plus,  // 3x3 plus
    Cross, // 5x5 plus with long arms
}

impl ShapeKind {
    pub fn all() -> [ShapeKind; 13] {
        [
            ShapeKind::Mono,
            ShapeKind::Domino,
            ShapeKind::I3,
            ShapeKind::V,
            ShapeKind::I,
            ShapeKind::O,
            ShapeKind::T,
            ShapeKind::L,
            ShapeKind::J,
            ShapeKind::S,
            ShapeKind::Z,
            ShapeKind::Plus,
            ShapeKind::Cross,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Mono => "MONO",
            ShapeKind::Domino => "DOMINO",
            ShapeKind::I3 => "I3",
            ShapeKind::V => "V",
            ShapeKind::I => "I",
            ShapeKind::O => "O",
            ShapeKind::T => "T",
            ShapeKind::L => "L",
            ShapeKind::J => "J",
            ShapeKind::S => "S",
            ShapeKind::Z => "Z",
            ShapeKind::Plus => "PLUS",
            ShapeKind::Cross => "CROSS",
        }
    }

    /// Bounding-box rows of the shape at rotation 0 (`1` = die)
    fn definition(&self) -> &'static [&'static [u8]] {
        match self {
            ShapeKind::Mono => &[&[1]],
            ShapeKind::Domino => &[&[1, 1]],
            ShapeKind::I3 => &[&[1, 1, 1]],
            // X.
            // XX
            ShapeKind::V => &[&[1, 0], &[1, 1]],
            ShapeKind::I => &[&[1, 1, 1, 1]],
            ShapeKind::O => &[&[1, 1], &[1, 1]],
            // XXX
            // .X.
            ShapeKind::T => &[&[1, 1, 1], &[0, 1, 0]],
            // X.
            // X.
            // XX
            ShapeKind::L => &[&[1, 0], &[1, 0], &[1, 1]],
            // .X
            // .X
            // XX
            ShapeKind::J => &[&[0, 1], &[0, 1], &[1, 1]],
            // .XX
            // XX.
            ShapeKind::S => &[&[0, 1, 1], &[1, 1, 0]],
            // XX.
            // .XX
            ShapeKind::Z => &[&[1, 1, 0], &[0, 1, 1]],
            ShapeKind::Plus => &[&[0, 1, 0], &[1, 1, 1], &[0, 1, 0]],
            ShapeKind::Cross => &[
                &[0, 0, 1, 0, 0],
                &[0, 0, 1, 0, 0],
                &[1, 1, 1, 1, 1],
                &[0, 0, 1, 0, 0],
                &[0, 0, 1, 0, 0],
            ],
        }
    }

    /// Side of the square matrix holding this shape
    pub fn matrix_size(&self) -> usize {
        let rows = self.definition();
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        rows.len().max(width)
    }

    /// Number of dice in the shape
    pub fn cell_count(&self) -> usize {
        self.definition()
            .iter()
            .map(|row| row.iter().filter(|&&c| c == 1).count())
            .sum()
    }

    /// Canonical occupancy matrix at the given rotation
    pub fn matrix(&self, rotation: Rotation) -> Vec<Vec<bool>> {
        let size = self.matrix_size();
        let mut matrix = vec![vec![false; size]; size];
        for (row, cells) in self.definition().iter().enumerate() {
            for (col, &cell) in cells.iter().enumerate() {
                matrix[row][col] = cell == 1;
            }
        }
        for _ in 0..rotation.quarter_turns() {
            matrix = rotate_cw(&matrix);
        }
        matrix
    }

    /// Shapes whose cell count fits within `max_cells`
    pub fn up_to(max_cells: usize) -> Vec<ShapeKind> {
        ShapeKind::all()
            .into_iter()
            .filter(|shape| shape.cell_count() <= max_cells)
            .collect()
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        ShapeKind::all()
            .into_iter()
            .find(|shape| shape.name() == upper)
            .ok_or_else(|| EngineError::UnknownShape(s.to_string()))
    }
}

/// Rotate a square matrix 90° clockwise into a new matrix
pub fn rotate_cw<T: Clone>(matrix: &[Vec<T>]) -> Vec<Vec<T>> {
    let size = matrix.len();
    (0..size)
        .map(|row| (0..size).map(|col| matrix[size - 1 - col][row].clone()).collect())
        .collect()
}

/// Clockwise rotation in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotate clockwise: 0 → 90 → 180 → 270 → 0
    pub fn cw(&self) -> Rotation {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    pub fn degrees(&self) -> u32 {
        self.quarter_turns() * 90
    }

    fn quarter_turns(&self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }
}
