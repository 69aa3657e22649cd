//! Active falling piece logic

use crate::die::Die;
use crate::error::EngineResult;
use crate::grid::{GRID_WIDTH, Grid, Position};
use crate::kicks::rotation_attempts;
use crate::shape::{Rotation, ShapeKind, rotate_cw};

/// A falling piece: a square matrix of dice cut from a shape
#[derive(Debug, Clone)]
pub struct Piece {
    pub shape: ShapeKind,
    pub rotation: Rotation,
    /// Grid coordinates of the matrix's top-left cell
    pub x: i32,
    pub y: i32,
    /// Dice stored as [row][col]
    cells: Vec<Vec<Option<Die>>>,
}

impl Piece {
    /// Build a piece at its spawn position. `make_die` is called once per
    /// occupied cell with the cell's index in row-major order.
    pub fn new(shape: ShapeKind, mut make_die: impl FnMut(usize) -> Die) -> Self {
        let mut index = 0;
        let cells = shape
            .matrix(Rotation::Deg0)
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|filled| {
                        filled.then(|| {
                            let die = make_die(index);
                            index += 1;
                            die
                        })
                    })
                    .collect()
            })
            .collect();

        let mut piece = Self {
            shape,
            rotation: Rotation::Deg0,
            x: 0,
            y: 0,
            cells,
        };
        piece.reset_to_spawn();
        piece
    }

    /// Build a piece from a shape name; unknown names are an error
    pub fn from_name(name: &str, make_die: impl FnMut(usize) -> Die) -> EngineResult<Self> {
        Ok(Self::new(name.parse()?, make_die))
    }

    /// Move to the default spawn column with every cell just above the grid
    pub fn reset_to_spawn(&mut self) {
        let size = self.matrix_size() as i32;
        let lowest_row = self
            .cell_offsets()
            .iter()
            .map(|&(_, dy)| dy)
            .max()
            .unwrap_or(0);
        self.x = (GRID_WIDTH as i32 - size) / 2;
        self.y = -(lowest_row + 1);
    }

    pub fn matrix_size(&self) -> usize {
        self.cells.len()
    }

    /// `(dx, dy)` offsets of occupied cells relative to the matrix origin
    pub fn cell_offsets(&self) -> Vec<(i32, i32)> {
        offsets_of(&self.cells)
    }

    /// Occupancy matrix at the current rotation
    pub fn occupancy(&self) -> Vec<Vec<bool>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(Option::is_some).collect())
            .collect()
    }

    pub fn cells(&self) -> &[Vec<Option<Die>>] {
        &self.cells
    }

    pub fn dice(&self) -> impl Iterator<Item = &Die> {
        self.cells.iter().flatten().flatten()
    }

    pub fn dice_count(&self) -> usize {
        self.dice().count()
    }

    pub fn is_empty(&self) -> bool {
        self.dice_count() == 0
    }

    /// Absolute grid positions of every die at the current placement
    pub fn lock_positions(&self) -> Vec<Position> {
        self.cell_offsets()
            .into_iter()
            .map(|(dx, dy)| Position::new(self.x + dx, self.y + dy))
            .collect()
    }

    /// Move every die out of the piece together with its absolute position
    pub fn take_dice(&mut self) -> Vec<(Position, Die)> {
        let (x, y) = (self.x, self.y);
        let mut taken = Vec::new();
        for (row, cells) in self.cells.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                if let Some(die) = cell.take() {
                    taken.push((Position::new(x + col as i32, y + row as i32), die));
                }
            }
        }
        taken
    }

    fn try_shift(&mut self, dx: i32, dy: i32, grid: &Grid) -> bool {
        if grid.check_collision(self, self.x + dx, self.y + dy) {
            return false;
        }
        self.x += dx;
        self.y += dy;
        true
    }

    /// Try to move left, returns true if successful
    pub fn move_left(&mut self, grid: &Grid) -> bool {
        self.try_shift(-1, 0, grid)
    }

    /// Try to move right, returns true if successful
    pub fn move_right(&mut self, grid: &Grid) -> bool {
        self.try_shift(1, 0, grid)
    }

    /// Try to move down, returns true if successful
    pub fn move_down(&mut self, grid: &Grid) -> bool {
        self.try_shift(0, 1, grid)
    }

    /// Rotate 90° clockwise, trying wall kicks when the rotated matrix
    /// collides in place. Nothing changes if every attempt collides.
    pub fn rotate(&mut self, grid: &Grid) -> bool {
        let rotated = rotate_cw(&self.cells);
        let offsets = offsets_of(&rotated);

        for kick in rotation_attempts() {
            if !grid.collides(&offsets, self.x + kick, self.y) {
                self.cells = rotated;
                self.x += kick;
                self.rotation = self.rotation.cw();
                return true;
            }
        }
        false
    }

    /// Move down as far as possible and return the distance dropped
    pub fn hard_drop(&mut self, grid: &Grid) -> i32 {
        match grid.find_drop_position(self, self.x) {
            Some(row) => {
                let distance = row - self.y;
                self.y = row;
                distance
            }
            None => 0,
        }
    }
}

fn offsets_of(cells: &[Vec<Option<Die>>]) -> Vec<(i32, i32)> {
    cells
        .iter()
        .enumerate()
        .flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_some())
                .map(move |(col, _)| (col as i32, row as i32))
        })
        .collect()
}
