//! Game modes: Easy, Medium, Hard, Expert, Zen

use crate::die::DieColor;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Available game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
    Zen, // no game over, the grid is trimmed instead
}

/// Static per-mode configuration read by the piece factory and the
/// placement-failure policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeConfig {
    pub dice_types: &'static [u32],
    pub colors: &'static [DieColor],
    pub max_piece_size: usize,
    pub black_die_chance: f64,
    pub wild_chance: f64,
    pub has_game_over: bool,
    /// Milliseconds per automatic one-row fall
    pub fall_speed_ms: u64,
}

impl ModeConfig {
    pub fn fall_interval(&self) -> Duration {
        Duration::from_millis(self.fall_speed_ms)
    }
}

const FOUR_COLORS: [DieColor; 4] = [DieColor::Red, DieColor::Blue, DieColor::Green, DieColor::Yellow];
const FIVE_COLORS: [DieColor; 5] = [
    DieColor::Red,
    DieColor::Blue,
    DieColor::Green,
    DieColor::Yellow,
    DieColor::Purple,
];
const SIX_COLORS: [DieColor; 6] = [
    DieColor::Red,
    DieColor::Blue,
    DieColor::Green,
    DieColor::Yellow,
    DieColor::Purple,
    DieColor::Orange,
];
const ALL_COLORS: [DieColor; 7] = [
    DieColor::Red,
    DieColor::Blue,
    DieColor::Green,
    DieColor::Yellow,
    DieColor::Purple,
    DieColor::Orange,
    DieColor::Cyan,
];

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Easy => "easy",
            GameMode::Medium => "medium",
            GameMode::Hard => "hard",
            GameMode::Expert => "expert",
            GameMode::Zen => "zen",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameMode::Easy => "Small pieces, d4 and d6, four colors",
            GameMode::Medium => "Tetromino-sized pieces, five colors",
            GameMode::Hard => "Pentomino pieces, six colors, rare black dice",
            GameMode::Expert => "Every shape and die, seven colors",
            GameMode::Zen => "No game over - the grid is trimmed when it fills",
        }
    }

    pub fn all() -> &'static [GameMode] {
        &[
            GameMode::Easy,
            GameMode::Medium,
            GameMode::Hard,
            GameMode::Expert,
            GameMode::Zen,
        ]
    }

    pub fn config(&self) -> ModeConfig {
        match self {
            GameMode::Easy => ModeConfig {
                dice_types: &[4, 6],
                colors: &FOUR_COLORS,
                max_piece_size: 3,
                black_die_chance: 0.0,
                wild_chance: 0.05,
                has_game_over: true,
                fall_speed_ms: 1000,
            },
            GameMode::Medium => ModeConfig {
                dice_types: &[4, 6, 8],
                colors: &FIVE_COLORS,
                max_piece_size: 4,
                black_die_chance: 0.0,
                wild_chance: 0.03,
                has_game_over: true,
                fall_speed_ms: 800,
            },
            GameMode::Hard => ModeConfig {
                dice_types: &[4, 6, 8, 10, 12],
                colors: &SIX_COLORS,
                max_piece_size: 5,
                black_die_chance: 0.01,
                wild_chance: 0.02,
                has_game_over: true,
                fall_speed_ms: 600,
            },
            GameMode::Expert => ModeConfig {
                dice_types: &[4, 6, 8, 10, 12, 20],
                colors: &ALL_COLORS,
                max_piece_size: 9,
                black_die_chance: 0.02,
                wild_chance: 0.01,
                has_game_over: true,
                fall_speed_ms: 400,
            },
            GameMode::Zen => ModeConfig {
                dice_types: &[4, 6, 8],
                colors: &FIVE_COLORS,
                max_piece_size: 4,
                black_die_chance: 0.0,
                wild_chance: 0.05,
                has_game_over: false,
                fall_speed_ms: 1000,
            },
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        GameMode::all()
            .iter()
            .copied()
            .find(|mode| mode.name() == lower)
            .ok_or_else(|| EngineError::UnknownMode(s.to_string()))
    }
}
