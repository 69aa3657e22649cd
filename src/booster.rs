//! Color boosters
//!
//! Clearing three or more dice of one color earns that color's booster. Each
//! color maps to exactly one effect; boosters run out after a span of time
//! or a number of locked pieces.

use crate::die::DieColor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// What a booster does while active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoosterKind {
    /// Multiplies turn scores by `value`
    ScoreMultiplier,
    /// Divides the fall speed by `1 / value`
    SlowFall,
    /// Adds `value` to the wild die chance
    WildChance,
    /// Banks `value` seconds for timed collaborators on activation
    ExtraTime,
    /// Modifies the cascade chain multiplier by `value`
    ChainBonus,
    /// Adds `value` to group sizes when picking effect tiers
    SizeBoost,
    /// Adds `value` milliseconds to the lock delay
    GravityDelay,
}

/// How long a booster stays active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoosterDuration {
    Time(Duration),
    Pieces(u32),
}

impl BoosterDuration {
    pub fn is_spent(&self) -> bool {
        match self {
            BoosterDuration::Time(left) => left.is_zero(),
            BoosterDuration::Pieces(left) => *left == 0,
        }
    }
}

/// How the chain bonus booster combines with the chain multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainBonusMode {
    #[default]
    Additive,
    Multiplicative,
}

/// Static effect for one color
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoosterDefinition {
    pub kind: BoosterKind,
    pub value: f64,
    pub duration: BoosterDuration,
}

impl BoosterDefinition {
    pub fn for_color(color: DieColor) -> Self {
        let (kind, value, duration) = match color {
            DieColor::Red => (
                BoosterKind::ScoreMultiplier,
                1.5,
                BoosterDuration::Time(Duration::from_secs(10)),
            ),
            DieColor::Orange => (BoosterKind::SizeBoost, 1.0, BoosterDuration::Pieces(3)),
            DieColor::Yellow => (
                BoosterKind::ExtraTime,
                10.0,
                BoosterDuration::Time(Duration::from_secs(5)),
            ),
            DieColor::Green => (BoosterKind::WildChance, 0.10, BoosterDuration::Pieces(5)),
            DieColor::Blue => (
                BoosterKind::SlowFall,
                0.5,
                BoosterDuration::Time(Duration::from_secs(15)),
            ),
            DieColor::Purple => (BoosterKind::ChainBonus, 1.0, BoosterDuration::Pieces(5)),
            DieColor::Cyan => (
                BoosterKind::GravityDelay,
                250.0,
                BoosterDuration::Time(Duration::from_secs(10)),
            ),
        };
        Self {
            kind,
            value,
            duration,
        }
    }
}

/// A booster earned by a color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBooster {
    pub color: DieColor,
    pub kind: BoosterKind,
    pub value: f64,
    pub remaining: BoosterDuration,
    pub active: bool,
}

impl ColorBooster {
    pub fn new(color: DieColor) -> Self {
        let definition = BoosterDefinition::for_color(color);
        Self {
            color,
            kind: definition.kind,
            value: definition.value,
            remaining: definition.duration,
            active: true,
        }
    }
}

/// Active boosters, at most one per color
#[derive(Debug, Clone, Default)]
pub struct BoosterRegistry {
    boosters: BTreeMap<DieColor, ColorBooster>,
    chain_mode: ChainBonusMode,
    banked_time: Duration,
}

impl BoosterRegistry {
    pub fn new(chain_mode: ChainBonusMode) -> Self {
        Self {
            chain_mode,
            ..Self::default()
        }
    }

    /// Activate a color's booster. Re-activating refreshes its duration.
    pub fn activate(&mut self, color: DieColor) -> ColorBooster {
        let booster = ColorBooster::new(color);
        if booster.kind == BoosterKind::ExtraTime {
            self.banked_time += Duration::from_secs_f64(booster.value);
        }
        self.boosters.insert(color, booster.clone());
        booster
    }

    pub fn is_active(&self, color: DieColor) -> bool {
        self.boosters.contains_key(&color)
    }

    pub fn get(&self, color: DieColor) -> Option<&ColorBooster> {
        self.boosters.get(&color)
    }

    pub fn active(&self) -> impl Iterator<Item = &ColorBooster> {
        self.boosters.values()
    }

    pub fn len(&self) -> usize {
        self.boosters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boosters.is_empty()
    }

    /// Advance time-based boosters; returns the ones that ran out
    pub fn tick(&mut self, dt: Duration) -> Vec<ColorBooster> {
        for booster in self.boosters.values_mut() {
            if let BoosterDuration::Time(left) = &mut booster.remaining {
                *left = left.saturating_sub(dt);
            }
        }
        self.remove_spent()
    }

    /// Count one locked piece against piece-based boosters; returns the ones
    /// that ran out
    pub fn on_piece_locked(&mut self) -> Vec<ColorBooster> {
        for booster in self.boosters.values_mut() {
            if let BoosterDuration::Pieces(left) = &mut booster.remaining {
                *left = left.saturating_sub(1);
            }
        }
        self.remove_spent()
    }

    fn remove_spent(&mut self) -> Vec<ColorBooster> {
        let spent: Vec<DieColor> = self
            .boosters
            .values()
            .filter(|b| b.remaining.is_spent())
            .map(|b| b.color)
            .collect();
        spent
            .into_iter()
            .filter_map(|color| self.boosters.remove(&color))
            .map(|mut booster| {
                booster.active = false;
                booster
            })
            .collect()
    }

    fn values_of(&self, kind: BoosterKind) -> impl Iterator<Item = f64> + '_ {
        self.boosters
            .values()
            .filter(move |b| b.kind == kind)
            .map(|b| b.value)
    }

    /// Product of active score multipliers, 1.0 when none
    pub fn score_multiplier(&self) -> f64 {
        self.values_of(BoosterKind::ScoreMultiplier).product()
    }

    /// Factor applied to fall speed (below 1.0 means slower)
    pub fn fall_speed_factor(&self) -> f64 {
        self.values_of(BoosterKind::SlowFall)
            .filter(|&v| v > 0.0)
            .product()
    }

    pub fn wild_chance_bonus(&self) -> f64 {
        self.values_of(BoosterKind::WildChance).sum()
    }

    pub fn size_bonus(&self) -> usize {
        self.values_of(BoosterKind::SizeBoost).sum::<f64>().max(0.0) as usize
    }

    pub fn gravity_delay(&self) -> Duration {
        Duration::from_secs_f64(self.values_of(BoosterKind::GravityDelay).sum::<f64>().max(0.0) / 1000.0)
    }

    /// Apply active chain bonuses to a chain multiplier
    pub fn apply_chain_bonus(&self, multiplier: f64) -> f64 {
        self.values_of(BoosterKind::ChainBonus)
            .fold(multiplier, |m, bonus| match self.chain_mode {
                ChainBonusMode::Additive => m + bonus,
                ChainBonusMode::Multiplicative => m * bonus,
            })
    }

    pub fn banked_time(&self) -> Duration {
        self.banked_time
    }

    /// Hand banked extra time to a timed collaborator
    pub fn take_banked_time(&mut self) -> Duration {
        std::mem::take(&mut self.banked_time)
    }

    pub fn clear(&mut self) {
        self.boosters.clear();
        self.banked_time = Duration::ZERO;
    }
}
