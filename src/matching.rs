//! Match detection by flood fill
//!
//! Cells are scanned row-major. Each unvisited die seeds a breadth-first
//! fill over its four orthogonal neighbours. A neighbour joins when it is
//! wild, shows the seed's face, or is reached from a wild die; a wild seed
//! accepts every connected die.
//! Visited marks are shared across one scan so no cell lands in two groups,
//! and regions smaller than [`MIN_MATCH_SIZE`] are dropped.

use crate::grid::{GRID_HEIGHT, GRID_WIDTH, Grid, Position, Region};
use crate::match_group::{MIN_MATCH_SIZE, MatchGroup};
use std::collections::VecDeque;

const NEIGHBOURS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Flood-fill match detector. One instance belongs to one game session and
/// reuses its scratch buffers between scans.
#[derive(Debug, Clone)]
pub struct MatchDetector {
    visited: [[bool; GRID_WIDTH]; GRID_HEIGHT],
    queue: VecDeque<Position>,
}

impl Default for MatchDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchDetector {
    pub fn new() -> Self {
        Self {
            visited: [[false; GRID_WIDTH]; GRID_HEIGHT],
            queue: VecDeque::with_capacity(GRID_WIDTH * GRID_HEIGHT),
        }
    }

    /// Find every match on the grid
    pub fn detect_matches(&mut self, grid: &Grid) -> Vec<MatchGroup> {
        self.detect_in_region(grid, Region::full())
    }

    /// Find matches whose seed lies inside `region`. The fill itself may
    /// extend past the region.
    pub fn detect_in_region(&mut self, grid: &Grid, region: Region) -> Vec<MatchGroup> {
        self.visited = [[false; GRID_WIDTH]; GRID_HEIGHT];
        let mut groups = Vec::new();

        for y in region.min_y.max(0)..=region.max_y.min(GRID_HEIGHT as i32 - 1) {
            for x in region.min_x.max(0)..=region.max_x.min(GRID_WIDTH as i32 - 1) {
                if self.visited[y as usize][x as usize] || grid.get(x, y).is_none() {
                    continue;
                }
                if let Some(group) = self.flood_fill(grid, Position::new(x, y)) {
                    groups.push(group);
                }
            }
        }

        tracing::trace!(groups = groups.len(), ?region, "match scan finished");
        groups
    }

    fn flood_fill(&mut self, grid: &Grid, seed: Position) -> Option<MatchGroup> {
        let seed_die = grid.get(seed.x, seed.y)?;
        // None when the seed is wild: every connected die matches
        let target = seed_die.match_value();

        let mut members = Vec::new();
        self.queue.clear();
        self.visited[seed.y as usize][seed.x as usize] = true;
        self.queue.push_back(seed);

        while let Some(pos) = self.queue.pop_front() {
            let Some(current) = grid.get(pos.x, pos.y) else {
                continue;
            };
            members.push((pos, current.clone()));
            for (dx, dy) in NEIGHBOURS {
                let (nx, ny) = (pos.x + dx, pos.y + dy);
                if !grid.is_valid_position(nx, ny) || self.visited[ny as usize][nx as usize] {
                    continue;
                }
                let Some(neighbour) = grid.get(nx, ny) else {
                    continue;
                };
                // Wild dice connect in both directions
                let joins = match target {
                    Some(value) => current.is_wild || neighbour.matches_value(value),
                    None => true,
                };
                if joins {
                    self.visited[ny as usize][nx as usize] = true;
                    self.queue.push_back(Position::new(nx, ny));
                }
            }
        }

        (members.len() >= MIN_MATCH_SIZE).then(|| MatchGroup::new(members, target.unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::die::{Die, DieColor};

    fn d6(face: u32) -> Die {
        Die::new(6, face, DieColor::Red).unwrap()
    }

    fn wild() -> Die {
        Die::wild(DieColor::Blue)
    }

    #[test]
    fn test_empty_grid_has_no_matches() {
        let mut detector = MatchDetector::new();
        assert!(detector.detect_matches(&Grid::new()).is_empty());
    }

    #[test]
    fn test_horizontal_run_of_three() {
        let mut grid = Grid::new();
        for x in 2..5 {
            grid.set_die(x, 19, d6(4)).unwrap();
        }
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size(), 3);
        assert_eq!(groups[0].matched_value(), 4);
    }

    #[test]
    fn test_adjacent_wild_extends_group() {
        let mut grid = Grid::new();
        for x in 2..5 {
            grid.set_die(x, 19, d6(4)).unwrap();
        }
        grid.set_die(5, 19, wild()).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size(), 4);
        assert_eq!(groups[0].matched_value(), 4);
    }

    #[test]
    fn test_pairs_are_ignored() {
        let mut grid = Grid::new();
        grid.set_die(0, 19, d6(3)).unwrap();
        grid.set_die(1, 19, d6(3)).unwrap();
        grid.set_die(2, 19, d6(5)).unwrap();
        assert!(MatchDetector::new().detect_matches(&grid).is_empty());
    }

    #[test]
    fn test_bent_shapes_match() {
        let mut grid = Grid::new();
        grid.set_die(0, 17, d6(2)).unwrap();
        grid.set_die(0, 18, d6(2)).unwrap();
        grid.set_die(0, 19, d6(2)).unwrap();
        grid.set_die(1, 19, d6(2)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size(), 4);
    }

    #[test]
    fn test_diagonals_do_not_connect() {
        let mut grid = Grid::new();
        grid.set_die(0, 17, d6(2)).unwrap();
        grid.set_die(1, 18, d6(2)).unwrap();
        grid.set_die(2, 19, d6(2)).unwrap();
        assert!(MatchDetector::new().detect_matches(&grid).is_empty());
    }

    #[test]
    fn test_wild_seed_takes_whole_component() {
        let mut grid = Grid::new();
        grid.set_die(0, 19, wild()).unwrap();
        grid.set_die(1, 19, d6(1)).unwrap();
        grid.set_die(2, 19, d6(6)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size(), 3);
        assert_eq!(groups[0].matched_value(), 0);
    }

    #[test]
    fn test_wild_links_onward() {
        // 3 3 W 5 5: the wild carries the group into the first five only
        let mut grid = Grid::new();
        grid.set_die(0, 19, d6(3)).unwrap();
        grid.set_die(1, 19, d6(3)).unwrap();
        grid.set_die(2, 19, wild()).unwrap();
        grid.set_die(3, 19, d6(5)).unwrap();
        grid.set_die(4, 19, d6(5)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].matched_value(), 3);
        assert_eq!(groups[0].size(), 4);
        assert!(!groups[0].positions().contains(&Position::new(4, 19)));
    }

    #[test]
    fn test_wild_bridges_different_faces() {
        // 4 W 3 3
        let mut grid = Grid::new();
        grid.set_die(0, 19, d6(4)).unwrap();
        grid.set_die(1, 19, wild()).unwrap();
        grid.set_die(2, 19, d6(3)).unwrap();
        grid.set_die(3, 19, d6(3)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].matched_value(), 4);
        assert_eq!(
            groups[0].positions(),
            &[Position::new(0, 19), Position::new(1, 19), Position::new(2, 19)]
        );
    }

    #[test]
    fn test_separate_groups() {
        let mut grid = Grid::new();
        for x in 0..3 {
            grid.set_die(x, 19, d6(1)).unwrap();
            grid.set_die(x + 5, 19, d6(2)).unwrap();
        }
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].matched_value(), 1);
        assert_eq!(groups[1].matched_value(), 2);
    }

    #[test]
    fn test_region_scan_limits_seeds() {
        let mut grid = Grid::new();
        for x in 0..3 {
            grid.set_die(x, 5, d6(1)).unwrap();
            grid.set_die(x, 19, d6(2)).unwrap();
        }
        let mut detector = MatchDetector::new();
        let region = Region { min_x: 0, min_y: 15, max_x: 9, max_y: 19 };
        let groups = detector.detect_in_region(&grid, region);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].matched_value(), 2);
    }

    #[test]
    fn test_region_fill_extends_past_region() {
        let mut grid = Grid::new();
        for y in 15..20 {
            grid.set_die(4, y, d6(6)).unwrap();
        }
        let region = Region { min_x: 4, min_y: 19, max_x: 4, max_y: 19 };
        let groups = MatchDetector::new().detect_in_region(&grid, region);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size(), 5);
    }
}
