//! Grid representation, collision detection and gravity

use crate::die::Die;
use crate::error::{EngineError, EngineResult};
use crate::piece::Piece;
use serde::{Deserialize, Serialize};

/// Grid dimensions
pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

/// Grid coordinates. Y grows downward; negative Y is the spawn zone above
/// the visible grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive rectangle of grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Region {
    /// The whole grid
    pub fn full() -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: GRID_WIDTH as i32 - 1,
            max_y: GRID_HEIGHT as i32 - 1,
        }
    }

    /// Bounding box of `positions` grown by `margin`, clipped to the grid.
    /// Returns `None` for an empty set.
    pub fn around(positions: &[Position], margin: i32) -> Option<Self> {
        let first = positions.first()?;
        let mut region = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for pos in &positions[1..] {
            region.min_x = region.min_x.min(pos.x);
            region.min_y = region.min_y.min(pos.y);
            region.max_x = region.max_x.max(pos.x);
            region.max_y = region.max_y.max(pos.y);
        }
        let full = Self::full();
        Some(Self {
            min_x: (region.min_x - margin).max(full.min_x),
            min_y: (region.min_y - margin).max(full.min_y),
            max_x: (region.max_x + margin).min(full.max_x),
            max_y: (region.max_y + margin).min(full.max_y),
        })
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// A single relocation performed by gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GravityMove {
    pub from: Position,
    pub to: Position,
}

/// The dice grid
#[derive(Debug, Clone)]
pub struct Grid {
    /// Cells stored as [y][x], y = 0 is the top row
    cells: [[Option<Die>; GRID_WIDTH]; GRID_HEIGHT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| std::array::from_fn(|_| None)),
        }
    }

    pub fn is_valid_position(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < GRID_WIDTH as i32 && y >= 0 && y < GRID_HEIGHT as i32
    }

    fn check_position(&self, x: i32, y: i32) -> EngineResult<(usize, usize)> {
        if self.is_valid_position(x, y) {
            Ok((x as usize, y as usize))
        } else {
            Err(EngineError::InvalidPosition { x, y })
        }
    }

    /// Whether a cell is empty. Out-of-range coordinates are an error.
    pub fn is_empty(&self, x: i32, y: i32) -> EngineResult<bool> {
        let (col, row) = self.check_position(x, y)?;
        Ok(self.cells[row][col].is_none())
    }

    /// Get the die at a position, `None` if empty or out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<&Die> {
        if !self.is_valid_position(x, y) {
            return None;
        }
        self.cells[y as usize][x as usize].as_ref()
    }

    /// Place a die, returning whatever was there before.
    /// Callers that want placement semantics check `is_empty` first.
    pub fn set_die(&mut self, x: i32, y: i32, die: Die) -> EngineResult<Option<Die>> {
        let (col, row) = self.check_position(x, y)?;
        Ok(self.cells[row][col].replace(die))
    }

    /// Remove and return the die at a position
    pub fn take_die(&mut self, x: i32, y: i32) -> EngineResult<Option<Die>> {
        let (col, row) = self.check_position(x, y)?;
        Ok(self.cells[row][col].take())
    }

    /// Check whether cells at the given `(dx, dy)` offsets collide when the
    /// offsets are anchored at `(x, y)`. Cells above the grid never collide.
    pub fn collides(&self, offsets: &[(i32, i32)], x: i32, y: i32) -> bool {
        offsets.iter().any(|&(dx, dy)| {
            let (tx, ty) = (x + dx, y + dy);
            if tx < 0 || tx >= GRID_WIDTH as i32 || ty >= GRID_HEIGHT as i32 {
                return true;
            }
            ty >= 0 && self.cells[ty as usize][tx as usize].is_some()
        })
    }

    /// Check whether `piece` would collide with its matrix origin at `(x, y)`
    pub fn check_collision(&self, piece: &Piece, x: i32, y: i32) -> bool {
        self.collides(&piece.cell_offsets(), x, y)
    }

    /// Transfer a piece's dice into the grid at its current position.
    ///
    /// The placement is all-or-nothing: if the piece collides, or any of its
    /// cells is still in the spawn zone, nothing changes. On success the
    /// piece is left empty and the placed positions are returned.
    pub fn add_piece(&mut self, piece: &mut Piece) -> EngineResult<Vec<Position>> {
        if self.check_collision(piece, piece.x, piece.y) {
            return Err(EngineError::CollisionRejected {
                x: piece.x,
                y: piece.y,
            });
        }
        let positions = piece.lock_positions();
        if positions.is_empty() || positions.iter().any(|p| !self.is_valid_position(p.x, p.y)) {
            return Err(EngineError::PlacementFailure);
        }

        for (pos, die) in piece.take_dice() {
            self.set_die(pos.x, pos.y, die)?;
        }
        Ok(positions)
    }

    /// Let every floating die fall to the lowest empty cell of its column.
    /// Returns the number of dice moved.
    pub fn apply_gravity(&mut self) -> usize {
        self.apply_gravity_tracked().len()
    }

    /// Gravity pass that reports each relocation.
    ///
    /// Columns are compacted bottom-up in a single pass, so each die lands on
    /// its final resting cell and never moves twice.
    pub fn apply_gravity_tracked(&mut self) -> Vec<GravityMove> {
        let mut moves = Vec::new();
        for x in 0..GRID_WIDTH {
            let mut write = GRID_HEIGHT;
            for y in (0..GRID_HEIGHT).rev() {
                if self.cells[y][x].is_none() {
                    continue;
                }
                write -= 1;
                if write != y {
                    let die = self.cells[y][x].take();
                    self.cells[write][x] = die;
                    moves.push(GravityMove {
                        from: Position::new(x as i32, y as i32),
                        to: Position::new(x as i32, write as i32),
                    });
                }
            }
        }
        moves
    }

    /// Remove every die in row `y`
    pub fn clear_row(&mut self, y: i32) -> EngineResult<Vec<(Position, Die)>> {
        let (_, row) = self.check_position(0, y)?;
        Ok((0..GRID_WIDTH)
            .filter_map(|col| {
                self.cells[row][col]
                    .take()
                    .map(|die| (Position::new(col as i32, y), die))
            })
            .collect())
    }

    /// Remove every die in column `x`
    pub fn clear_column(&mut self, x: i32) -> EngineResult<Vec<(Position, Die)>> {
        let (col, _) = self.check_position(x, 0)?;
        Ok((0..GRID_HEIGHT)
            .filter_map(|row| {
                self.cells[row][col]
                    .take()
                    .map(|die| (Position::new(x, row as i32), die))
            })
            .collect())
    }

    /// Remove every die in the `size`×`size` square centred on `(cx, cy)`,
    /// clipped to the grid
    pub fn clear_area(&mut self, cx: i32, cy: i32, size: u32) -> Vec<(Position, Die)> {
        let half = (size / 2) as i32;
        let mut removed = Vec::new();
        for y in (cy - half)..=(cy + half) {
            for x in (cx - half)..=(cx + half) {
                if let Some(die) = self.take_die(x, y).ok().flatten() {
                    removed.push((Position::new(x, y), die));
                }
            }
        }
        removed
    }

    /// Remove the dice at the given positions; empty or invalid cells are skipped
    pub fn clear_cells(&mut self, positions: &[Position]) -> Vec<(Position, Die)> {
        positions
            .iter()
            .filter_map(|&pos| {
                self.take_die(pos.x, pos.y)
                    .ok()
                    .flatten()
                    .map(|die| (pos, die))
            })
            .collect()
    }

    /// Remove every die in the top `rows` rows
    pub fn clear_top_rows(&mut self, rows: usize) -> Vec<(Position, Die)> {
        let mut removed = Vec::new();
        for y in 0..rows.min(GRID_HEIGHT) {
            removed.extend(self.clear_row(y as i32).unwrap_or_default());
        }
        removed
    }

    /// Remove every die on the grid
    pub fn clear_all(&mut self) -> Vec<(Position, Die)> {
        self.clear_top_rows(GRID_HEIGHT)
    }

    /// The top row has no empty cell
    pub fn is_full(&self) -> bool {
        self.cells[0].iter().all(|cell| cell.is_some())
    }

    /// Resting row for `piece` dropped at column `x`, starting from its
    /// current row. `None` if the piece already collides there.
    pub fn find_drop_position(&self, piece: &Piece, x: i32) -> Option<i32> {
        let offsets = piece.cell_offsets();
        if offsets.is_empty() || self.collides(&offsets, x, piece.y) {
            return None;
        }
        let mut y = piece.y;
        while !self.collides(&offsets, x, y + 1) {
            y += 1;
        }
        Some(y)
    }

    /// Iterate over occupied cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Die)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().filter_map(move |(x, cell)| {
                cell.as_ref()
                    .map(|die| (Position::new(x as i32, y as i32), die))
            })
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.iter().count()
    }

    /// Check if the grid has no dice at all
    pub fn is_clear(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_none()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::DieColor;
    use crate::shape::ShapeKind;

    fn d6(face: u32) -> Die {
        Die::new(6, face, DieColor::Red).unwrap()
    }

    fn piece(shape: ShapeKind, x: i32, y: i32) -> Piece {
        let mut piece = Piece::new(shape, |_| d6(1));
        piece.x = x;
        piece.y = y;
        piece
    }

    #[test]
    fn test_new_grid_is_clear() {
        let grid = Grid::new();
        assert!(grid.is_clear());
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_empty_set_clear_cycle() {
        let mut grid = Grid::new();
        assert!(grid.is_empty(3, 7).unwrap());
        grid.set_die(3, 7, d6(2)).unwrap();
        assert!(!grid.is_empty(3, 7).unwrap());
        grid.clear_cells(&[Position::new(3, 7)]);
        assert!(grid.is_empty(3, 7).unwrap());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new();
        assert!(matches!(
            grid.is_empty(-1, 0),
            Err(EngineError::InvalidPosition { x: -1, y: 0 })
        ));
        assert!(grid.is_empty(0, GRID_HEIGHT as i32).is_err());
        assert!(grid.set_die(GRID_WIDTH as i32, 0, d6(1)).is_err());
        assert!(grid.get(0, -1).is_none());
    }

    #[test]
    fn test_set_die_overwrites() {
        let mut grid = Grid::new();
        assert_eq!(grid.set_die(0, 0, d6(1)).unwrap(), None);
        let previous = grid.set_die(0, 0, d6(5)).unwrap();
        assert_eq!(previous.map(|d| d.face), Some(1));
        assert_eq!(grid.get(0, 0).map(|d| d.face), Some(5));
    }

    #[test]
    fn test_collision_bounds() {
        let grid = Grid::new();
        let o = piece(ShapeKind::O, 0, 0);
        assert!(grid.check_collision(&o, -1, 5));
        assert!(grid.check_collision(&o, 9, 5));
        assert!(grid.check_collision(&o, 4, 19));
        assert!(!grid.check_collision(&o, 8, 18));
    }

    #[test]
    fn test_spawn_zone_never_collides() {
        let mut grid = Grid::new();
        for x in 0..GRID_WIDTH as i32 {
            grid.set_die(x, 0, d6(1)).unwrap();
        }
        let o = piece(ShapeKind::O, 4, -2);
        assert!(!grid.check_collision(&o, 4, -2));
        assert!(grid.check_collision(&o, 4, -1));
    }

    #[test]
    fn test_add_piece_transfers_dice() {
        let mut grid = Grid::new();
        let mut o = piece(ShapeKind::O, 4, 18);
        let placed = grid.add_piece(&mut o).unwrap();
        assert_eq!(placed.len(), 4);
        assert_eq!(grid.occupied_count(), 4);
        assert_eq!(o.dice_count(), 0);
        assert!(grid.get(5, 19).is_some());
    }

    #[test]
    fn test_add_piece_rejects_spawn_zone() {
        let mut grid = Grid::new();
        let mut o = piece(ShapeKind::O, 4, -1);
        assert!(matches!(
            grid.add_piece(&mut o),
            Err(EngineError::PlacementFailure)
        ));
        assert_eq!(o.dice_count(), 4);
        assert!(grid.is_clear());
    }

    #[test]
    fn test_add_piece_rejects_overlap() {
        let mut grid = Grid::new();
        grid.set_die(5, 19, d6(1)).unwrap();
        let mut o = piece(ShapeKind::O, 4, 18);
        assert!(grid.add_piece(&mut o).is_err());
        assert_eq!(o.dice_count(), 4);
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn test_gravity_drops_floating_dice() {
        let mut grid = Grid::new();
        grid.set_die(2, 5, d6(1)).unwrap();
        grid.set_die(2, 3, d6(2)).unwrap();
        grid.set_die(7, 19, d6(3)).unwrap();

        let moves = grid.apply_gravity_tracked();
        assert_eq!(moves.len(), 2);
        assert_eq!(grid.get(2, 19).map(|d| d.face), Some(1));
        assert_eq!(grid.get(2, 18).map(|d| d.face), Some(2));
        assert_eq!(grid.get(7, 19).map(|d| d.face), Some(3));
        assert_eq!(grid.apply_gravity(), 0);
    }

    #[test]
    fn test_clear_row_and_column() {
        let mut grid = Grid::new();
        for x in 0..GRID_WIDTH as i32 {
            grid.set_die(x, 19, d6(1)).unwrap();
        }
        grid.set_die(0, 18, d6(2)).unwrap();

        assert_eq!(grid.clear_row(19).unwrap().len(), 10);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.clear_column(0).unwrap().len(), 1);
        assert!(grid.is_clear());
        assert!(grid.clear_row(20).is_err());
    }

    #[test]
    fn test_clear_area_is_clipped() {
        let mut grid = Grid::new();
        for y in 0..GRID_HEIGHT as i32 {
            for x in 0..GRID_WIDTH as i32 {
                grid.set_die(x, y, d6(1)).unwrap();
            }
        }
        // 7x7 centred at the corner covers a 4x4 block
        let removed = grid.clear_area(0, 0, 7);
        assert_eq!(removed.len(), 16);
        assert!(grid.get(3, 3).is_none());
        assert!(grid.get(4, 4).is_some());
    }

    #[test]
    fn test_is_full_checks_top_row() {
        let mut grid = Grid::new();
        for x in 0..GRID_WIDTH as i32 - 1 {
            grid.set_die(x, 0, d6(1)).unwrap();
        }
        assert!(!grid.is_full());
        grid.set_die(9, 0, d6(1)).unwrap();
        assert!(grid.is_full());
    }

    #[test]
    fn test_find_drop_position() {
        let mut grid = Grid::new();
        let o = piece(ShapeKind::O, 4, -2);
        assert_eq!(grid.find_drop_position(&o, 4), Some(18));

        grid.set_die(4, 10, d6(1)).unwrap();
        assert_eq!(grid.find_drop_position(&o, 4), Some(8));
        assert_eq!(grid.find_drop_position(&o, 6), Some(18));
        assert_eq!(grid.find_drop_position(&o, 9), None);
    }

    #[test]
    fn test_region_around_is_clipped() {
        let region = Region::around(&[Position::new(0, 19), Position::new(2, 17)], 1).unwrap();
        assert_eq!(region, Region { min_x: 0, min_y: 16, max_x: 3, max_y: 19 });
        assert!(Region::around(&[], 1).is_none());
    }
}
