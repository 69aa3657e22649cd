//! Dice: the tokens that fill pieces and the grid

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side counts a die may have
pub const ALLOWED_SIDES: [u32; 6] = [4, 6, 8, 10, 12, 20];

/// Side count used for black dice
pub const BLACK_DIE_SIDES: u32 = 20;

/// Side count used for wild dice created by match effects
pub const WILD_DIE_SIDES: u32 = 6;

/// The 7 die colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Cyan,
}

impl DieColor {
    pub fn all() -> [DieColor; 7] {
        [
            DieColor::Red,
            DieColor::Orange,
            DieColor::Yellow,
            DieColor::Green,
            DieColor::Blue,
            DieColor::Purple,
            DieColor::Cyan,
        ]
    }

    /// Index into per-color tallies
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DieColor::Red => "red",
            DieColor::Orange => "orange",
            DieColor::Yellow => "yellow",
            DieColor::Green => "green",
            DieColor::Blue => "blue",
            DieColor::Purple => "purple",
            DieColor::Cyan => "cyan",
        }
    }
}

impl fmt::Display for DieColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single die. Owned by a piece until it locks, then by the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    pub id: u32,
    pub sides: u32,
    pub face: u32,
    pub color: DieColor,
    pub is_wild: bool,
    pub is_black: bool,
}

impl Die {
    /// Create a regular die, validating the side count and face
    pub fn new(sides: u32, face: u32, color: DieColor) -> EngineResult<Self> {
        if !ALLOWED_SIDES.contains(&sides) || face == 0 || face > sides {
            return Err(EngineError::InvalidDie { sides, face });
        }
        Ok(Self {
            id: 0,
            sides,
            face,
            color,
            is_wild: false,
            is_black: false,
        })
    }

    /// A wild die that connects to any neighbour
    pub fn wild(color: DieColor) -> Self {
        Self {
            id: 0,
            sides: WILD_DIE_SIDES,
            face: 1,
            color,
            is_wild: true,
            is_black: false,
        }
    }

    /// A black die: always wild, always a d20
    pub fn black(face: u32, color: DieColor) -> Self {
        Self {
            id: 0,
            sides: BLACK_DIE_SIDES,
            face: face.clamp(1, BLACK_DIE_SIDES),
            color,
            is_wild: true,
            is_black: true,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    /// Face used for matching, `None` when the die is wild
    pub fn match_value(&self) -> Option<u32> {
        if self.is_wild { None } else { Some(self.face) }
    }

    /// Whether this die connects to a group whose target value is `value`
    pub fn matches_value(&self, value: u32) -> bool {
        self.is_wild || self.face == value
    }
}
