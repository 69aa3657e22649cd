//! Matched groups and the effects they trigger
//!
//! A [`MatchGroup`] is a snapshot of one connected region found by the
//! detector. Everything here is a pure function of that snapshot: the size
//! tier, where a line or area effect is centred, the base score, which
//! colors earn a booster and whether the group is an Ultimate Combo.

use crate::die::{Die, DieColor};
use crate::grid::Position;
use serde::{Deserialize, Serialize};

/// Smallest connected region that counts as a match
pub const MIN_MATCH_SIZE: usize = 3;

/// Side of the square cleared by an area clear
pub const AREA_CLEAR_SIZE: u32 = 7;

/// Size-tiered special effects, highest qualifying tier wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialEffect {
    /// Clear only the matched dice (3)
    Standard,
    /// Clear the row or column through the centroid (4)
    LineClear,
    /// Clear the group, then drop in one wild die (5-6)
    SpawnWild,
    /// Clear a 7×7 square around the centroid (7-8)
    AreaClear,
    /// Clear the entire grid (9+)
    GridClear,
}

impl SpecialEffect {
    pub fn for_size(size: usize) -> Self {
        match size {
            s if s >= 9 => SpecialEffect::GridClear,
            s if s >= 7 => SpecialEffect::AreaClear,
            s if s >= 5 => SpecialEffect::SpawnWild,
            s if s >= 4 => SpecialEffect::LineClear,
            _ => SpecialEffect::Standard,
        }
    }
}

/// Orientation chosen by a line clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineAxis {
    Row(i32),
    Column(i32),
}

/// A confirmed match: a connected set of at least three dice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchGroup {
    positions: Vec<Position>,
    dice: Vec<Die>,
    /// Common face value; 0 when the group was seeded by a wild die
    matched_value: u32,
    color_counts: [usize; 7],
}

impl MatchGroup {
    /// Build a snapshot from `(position, die)` pairs in discovery order
    pub fn new(members: Vec<(Position, Die)>, matched_value: u32) -> Self {
        let mut color_counts = [0; 7];
        let mut positions = Vec::with_capacity(members.len());
        let mut dice = Vec::with_capacity(members.len());
        for (pos, die) in members {
            color_counts[die.color.index()] += 1;
            positions.push(pos);
            dice.push(die);
        }
        Self {
            positions,
            dice,
            matched_value,
            color_counts,
        }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    pub fn matched_value(&self) -> u32 {
        self.matched_value
    }

    pub fn size(&self) -> usize {
        self.positions.len()
    }

    pub fn color_count(&self, color: DieColor) -> usize {
        self.color_counts[color.index()]
    }

    /// Integer-rounded mean of member positions
    pub fn centroid(&self) -> Position {
        centroid_of(&self.positions)
    }

    /// Effect tier of this group
    pub fn effect(&self) -> SpecialEffect {
        SpecialEffect::for_size(self.size())
    }

    /// Effect tier with a booster size bonus added to the group size
    pub fn effect_with_bonus(&self, size_bonus: usize) -> SpecialEffect {
        SpecialEffect::for_size(self.size() + size_bonus)
    }

    /// Row when the horizontal span is at least the vertical span,
    /// otherwise column, through the centroid
    pub fn line_axis(&self) -> LineAxis {
        let (min_x, max_x) = span(self.positions.iter().map(|p| p.x));
        let (min_y, max_y) = span(self.positions.iter().map(|p| p.y));
        let centroid = self.centroid();
        if max_x - min_x >= max_y - min_y {
            LineAxis::Row(centroid.y)
        } else {
            LineAxis::Column(centroid.x)
        }
    }

    /// `(Σ sides) × size × value`, with wild-seeded groups counting value 1
    pub fn base_score(&self) -> u64 {
        let sides: u64 = self.dice.iter().map(|d| d.sides as u64).sum();
        let value = if self.matched_value == 0 { 1 } else { self.matched_value as u64 };
        sides * self.size() as u64 * value
    }

    /// Colors that earn a booster: among colors with at least three dice,
    /// every color tied for the highest count
    pub fn booster_colors(&self) -> Vec<DieColor> {
        let best = DieColor::all()
            .into_iter()
            .map(|color| self.color_count(color))
            .filter(|&count| count >= MIN_MATCH_SIZE)
            .max();
        match best {
            Some(best) => DieColor::all()
                .into_iter()
                .filter(|&color| self.color_count(color) == best)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Three or more dice, every one of them wild
    pub fn is_ultimate_combo(&self) -> bool {
        self.size() >= MIN_MATCH_SIZE && self.dice.iter().all(|d| d.is_wild)
    }
}

/// Integer-rounded mean of a set of positions
pub fn centroid_of(positions: &[Position]) -> Position {
    if positions.is_empty() {
        return Position::new(0, 0);
    }
    let n = positions.len() as f64;
    let sum_x: i64 = positions.iter().map(|p| p.x as i64).sum();
    let sum_y: i64 = positions.iter().map(|p| p.y as i64).sum();
    Position::new(
        (sum_x as f64 / n).round() as i32,
        (sum_y as f64 / n).round() as i32,
    )
}

fn span(values: impl Iterator<Item = i32>) -> (i32, i32) {
    values.fold((i32::MAX, i32::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn die(sides: u32, face: u32, color: DieColor) -> Die {
        Die::new(sides, face, color).unwrap()
    }

    fn row_group(len: usize, y: i32, make: impl Fn(usize) -> Die, value: u32) -> MatchGroup {
        MatchGroup::new(
            (0..len).map(|i| (Position::new(i as i32, y), make(i))).collect(),
            value,
        )
    }

    #[test]
    fn test_effect_tiers() {
        assert_eq!(SpecialEffect::for_size(3), SpecialEffect::Standard);
        assert_eq!(SpecialEffect::for_size(4), SpecialEffect::LineClear);
        assert_eq!(SpecialEffect::for_size(5), SpecialEffect::SpawnWild);
        assert_eq!(SpecialEffect::for_size(6), SpecialEffect::SpawnWild);
        assert_eq!(SpecialEffect::for_size(7), SpecialEffect::AreaClear);
        assert_eq!(SpecialEffect::for_size(8), SpecialEffect::AreaClear);
        assert_eq!(SpecialEffect::for_size(9), SpecialEffect::GridClear);
        assert_eq!(SpecialEffect::for_size(40), SpecialEffect::GridClear);
    }

    #[test]
    fn test_base_score() {
        let group = row_group(3, 19, |_| die(6, 2, DieColor::Red), 2);
        assert_eq!(group.base_score(), 108);
    }

    #[test]
    fn test_wild_seeded_score_uses_one() {
        let group = row_group(3, 19, |_| Die::wild(DieColor::Red), 0);
        assert_eq!(group.base_score(), 18 * 3);
    }

    #[test]
    fn test_centroid_rounds() {
        let group = row_group(4, 10, |_| die(6, 1, DieColor::Red), 1);
        // mean x = 1.5 rounds away from zero
        assert_eq!(group.centroid(), Position::new(2, 10));
    }

    #[test]
    fn test_line_axis() {
        let horizontal = row_group(4, 19, |_| die(6, 1, DieColor::Red), 1);
        assert_eq!(horizontal.line_axis(), LineAxis::Row(19));

        let vertical = MatchGroup::new(
            (0..4).map(|y| (Position::new(3, 16 + y), die(6, 1, DieColor::Red))).collect(),
            1,
        );
        assert_eq!(vertical.line_axis(), LineAxis::Column(3));
    }

    #[test]
    fn test_booster_colors_pick_the_majority() {
        let colors = [DieColor::Red, DieColor::Red, DieColor::Red, DieColor::Blue];
        let group = row_group(4, 19, |i| die(6, 1, colors[i]), 1);
        assert_eq!(group.booster_colors(), vec![DieColor::Red]);
    }

    #[test]
    fn test_booster_colors_ties() {
        let colors = [
            DieColor::Red,
            DieColor::Green,
            DieColor::Red,
            DieColor::Green,
            DieColor::Red,
            DieColor::Green,
        ];
        let group = row_group(6, 19, |i| die(6, 1, colors[i]), 1);
        assert_eq!(group.booster_colors(), vec![DieColor::Red, DieColor::Green]);
    }

    #[test]
    fn test_booster_needs_three_of_a_color() {
        let colors = [DieColor::Red, DieColor::Red, DieColor::Blue, DieColor::Blue];
        let group = row_group(4, 19, |i| die(6, 1, colors[i]), 1);
        assert!(group.booster_colors().is_empty());
    }

    #[test]
    fn test_ultimate_combo() {
        let all_wild = row_group(3, 19, |_| Die::wild(DieColor::Red), 0);
        assert!(all_wild.is_ultimate_combo());

        let two_wild = row_group(
            3,
            19,
            |i| if i < 2 { Die::wild(DieColor::Red) } else { die(6, 3, DieColor::Red) },
            0,
        );
        assert!(!two_wild.is_ultimate_combo());
    }
}
