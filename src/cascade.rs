//! Cascade resolution: clearing matched groups, settling the grid and
//! tracking how deep the chain has gone

use crate::die::{Die, DieColor};
use crate::grid::{GravityMove, Grid, Position, Region};
use crate::match_group::{AREA_CLEAR_SIZE, LineAxis, MatchGroup, SpecialEffect};
use serde::Serialize;

/// Default ceiling on cascade steps within one turn
pub const DEFAULT_MAX_CASCADES: u32 = 32;

/// Result of committing the clears for one step
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClearOutcome {
    /// Dice removed from the grid, released to the caller
    pub removed: Vec<(Position, Die)>,
    /// Cells that received a wild die from a spawn-wild effect
    pub spawned_wilds: Vec<Position>,
    /// Effect applied for each group, in group order
    pub effects: Vec<SpecialEffect>,
}

/// Cascade bookkeeping for the turn in progress
#[derive(Debug, Clone)]
pub struct CascadeManager {
    cascade_index: u32,
    max_cascades: u32,
    /// Cells touched since the last scan, used to bound the rescan
    touched: Vec<Position>,
}

impl Default for CascadeManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CASCADES)
    }
}

impl CascadeManager {
    pub fn new(max_cascades: u32) -> Self {
        Self {
            cascade_index: 0,
            max_cascades,
            touched: Vec::new(),
        }
    }

    /// 0 for the match right after a lock, 1 for the first cascade, ...
    pub fn cascade_index(&self) -> u32 {
        self.cascade_index
    }

    /// Start of a new cycle. Returns false once the chain exceeds the limit.
    pub fn advance(&mut self) -> bool {
        self.cascade_index += 1;
        self.cascade_index <= self.max_cascades
    }

    pub fn reset(&mut self) {
        self.cascade_index = 0;
        self.touched.clear();
    }

    /// Remove every group and whatever its effect reaches. `size_bonus` is
    /// added to group sizes when picking effect tiers.
    pub fn apply_clears(
        &mut self,
        grid: &mut Grid,
        groups: &[MatchGroup],
        size_bonus: usize,
    ) -> ClearOutcome {
        let mut outcome = ClearOutcome::default();
        let mut wild_requests = Vec::new();

        for group in groups {
            let effect = group.effect_with_bonus(size_bonus);
            outcome.removed.extend(grid.clear_cells(group.positions()));
            outcome.removed.extend(clear_effect(grid, group, effect));
            if effect == SpecialEffect::SpawnWild {
                wild_requests.push(group);
            }
            outcome.effects.push(effect);
        }
        self.touched.extend(outcome.removed.iter().map(|(pos, _)| *pos));

        for group in wild_requests {
            let centroid = group.centroid();
            let target = if grid.is_empty(centroid.x, centroid.y).unwrap_or(false) {
                Some(centroid)
            } else {
                group
                    .positions()
                    .iter()
                    .copied()
                    .find(|p| grid.is_empty(p.x, p.y).unwrap_or(false))
            };
            let Some(target) = target else {
                continue;
            };
            let color = group.dice().first().map(|d| d.color).unwrap_or(DieColor::Red);
            if grid.set_die(target.x, target.y, Die::wild(color)).is_ok() {
                outcome.spawned_wilds.push(target);
                self.touched.push(target);
            }
        }

        outcome
    }

    /// Apply gravity and remember where dice landed
    pub fn settle(&mut self, grid: &mut Grid) -> Vec<GravityMove> {
        let moves = grid.apply_gravity_tracked();
        self.touched.extend(moves.iter().map(|m| m.to));
        moves
    }

    /// Region worth rescanning after the last clear and settle, grown by one
    /// cell so new neighbours of landed dice are seeded too
    pub fn take_rescan_region(&mut self) -> Option<Region> {
        let region = Region::around(&self.touched, 1);
        self.touched.clear();
        region
    }
}

/// Dice an effect removes beyond the group itself
fn clear_effect(grid: &mut Grid, group: &MatchGroup, effect: SpecialEffect) -> Vec<(Position, Die)> {
    match effect {
        SpecialEffect::Standard | SpecialEffect::SpawnWild => Vec::new(),
        SpecialEffect::LineClear => {
            let line = match group.line_axis() {
                LineAxis::Row(y) => grid.clear_row(y),
                LineAxis::Column(x) => grid.clear_column(x),
            };
            line.unwrap_or_default()
        }
        SpecialEffect::AreaClear => {
            let centroid = group.centroid();
            grid.clear_area(centroid.x, centroid.y, AREA_CLEAR_SIZE)
        }
        SpecialEffect::GridClear => grid.clear_all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GRID_WIDTH;
    use crate::matching::MatchDetector;

    fn d6(face: u32) -> Die {
        Die::new(6, face, DieColor::Red).unwrap()
    }

    #[test]
    fn test_advance_respects_limit() {
        let mut cascade = CascadeManager::new(2);
        assert!(cascade.advance());
        assert!(cascade.advance());
        assert!(!cascade.advance());
        cascade.reset();
        assert_eq!(cascade.cascade_index(), 0);
    }

    #[test]
    fn test_standard_clear_removes_group_only() {
        let mut grid = Grid::new();
        for x in 0..3 {
            grid.set_die(x, 19, d6(2)).unwrap();
        }
        grid.set_die(5, 19, d6(6)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);

        let mut cascade = CascadeManager::default();
        let outcome = cascade.apply_clears(&mut grid, &groups, 0);
        assert_eq!(outcome.removed.len(), 3);
        assert_eq!(outcome.effects, vec![SpecialEffect::Standard]);
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn test_line_clear_takes_whole_row() {
        let mut grid = Grid::new();
        for x in 0..4 {
            grid.set_die(x, 19, d6(2)).unwrap();
        }
        for x in 5..GRID_WIDTH as i32 {
            grid.set_die(x, 19, d6(x as u32 % 6 + 1)).unwrap();
        }
        grid.set_die(9, 18, d6(1)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 1);

        let mut cascade = CascadeManager::default();
        let outcome = cascade.apply_clears(&mut grid, &groups, 0);
        assert_eq!(outcome.effects, vec![SpecialEffect::LineClear]);
        assert_eq!(grid.occupied_count(), 1);
        assert!(grid.get(9, 18).is_some());
    }

    #[test]
    fn test_line_clear_takes_whole_column() {
        let mut grid = Grid::new();
        for y in 16..20 {
            grid.set_die(2, y, d6(4)).unwrap();
        }
        for y in 0..3 {
            grid.set_die(2, y, d6(y as u32 + 1)).unwrap();
        }
        grid.set_die(3, 19, d6(6)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 1);

        let outcome = CascadeManager::default().apply_clears(&mut grid, &groups, 0);
        assert_eq!(outcome.effects, vec![SpecialEffect::LineClear]);
        assert_eq!(outcome.removed.len(), 7);
        assert_eq!(grid.occupied_count(), 1);
        assert!(grid.get(3, 19).is_some());
    }

    #[test]
    fn test_area_clear_is_clipped_to_grid() {
        let mut grid = Grid::new();
        for x in 0..7 {
            grid.set_die(x, 19, d6(2)).unwrap();
        }
        // Inside the square around (3, 19)
        grid.set_die(0, 16, d6(5)).unwrap();
        grid.set_die(6, 18, d6(1)).unwrap();
        // Outside it
        grid.set_die(7, 19, d6(6)).unwrap();
        grid.set_die(3, 15, d6(4)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);
        assert_eq!(groups.len(), 1);

        let outcome = CascadeManager::default().apply_clears(&mut grid, &groups, 0);
        assert_eq!(outcome.effects, vec![SpecialEffect::AreaClear]);
        assert_eq!(outcome.removed.len(), 9);
        assert_eq!(grid.occupied_count(), 2);
        assert!(grid.get(7, 19).is_some());
        assert!(grid.get(3, 15).is_some());
    }

    #[test]
    fn test_grid_clear_empties_the_grid() {
        let mut grid = Grid::new();
        for x in 0..9 {
            grid.set_die(x, 19, d6(3)).unwrap();
        }
        grid.set_die(9, 0, d6(1)).unwrap();
        grid.set_die(0, 5, d6(6)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);

        let outcome = CascadeManager::default().apply_clears(&mut grid, &groups, 0);
        assert_eq!(outcome.effects, vec![SpecialEffect::GridClear]);
        assert_eq!(outcome.removed.len(), 11);
        assert!(grid.is_clear());
    }

    #[test]
    fn test_size_bonus_upgrades_tier() {
        let mut grid = Grid::new();
        for x in 0..3 {
            grid.set_die(x, 19, d6(2)).unwrap();
        }
        let groups = MatchDetector::new().detect_matches(&grid);
        let outcome = CascadeManager::default().apply_clears(&mut grid, &groups, 1);
        assert_eq!(outcome.effects, vec![SpecialEffect::LineClear]);
    }

    #[test]
    fn test_spawn_wild_lands_on_centroid() {
        let mut grid = Grid::new();
        for x in 0..5 {
            grid.set_die(x, 19, d6(3)).unwrap();
        }
        let groups = MatchDetector::new().detect_matches(&grid);
        let outcome = CascadeManager::default().apply_clears(&mut grid, &groups, 0);
        assert_eq!(outcome.spawned_wilds, vec![Position::new(2, 19)]);
        assert_eq!(grid.occupied_count(), 1);
        assert!(grid.get(2, 19).is_some_and(|d| d.is_wild));
    }

    #[test]
    fn test_rescan_region_follows_landed_dice() {
        let mut grid = Grid::new();
        for x in 0..3 {
            grid.set_die(x, 19, d6(2)).unwrap();
        }
        grid.set_die(1, 18, d6(5)).unwrap();
        let groups = MatchDetector::new().detect_matches(&grid);

        let mut cascade = CascadeManager::default();
        cascade.apply_clears(&mut grid, &groups, 0);
        let moves = cascade.settle(&mut grid);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, Position::new(1, 19));

        let region = cascade.take_rescan_region().unwrap();
        assert!(region.contains(1, 19));
        assert!(region.contains(0, 18));
        assert!(cascade.take_rescan_region().is_none());
    }
}
