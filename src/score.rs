//! Scoring: per-turn accumulation, chain and combo multipliers
//!
//! A turn runs from a piece locking until the next spawn and includes every
//! cascade it causes. Each match adds `base × chain factor` to the turn; when
//! the turn ends the raw sum is multiplied by the Ultimate Combo factor and
//! the active booster factor, floored, and recorded as one
//! [`ScoreBreakdown`].

use crate::booster::{BoosterRegistry, ChainBonusMode, ColorBooster};
use crate::die::DieColor;
use crate::match_group::MatchGroup;
use serde::{Deserialize, Serialize};

/// Turn multiplier when any Ultimate Combo occurs
pub const ULTIMATE_COMBO_MULTIPLIER: u32 = 5;

/// Final score summary for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Sum of group base scores
    pub base_score: u64,
    /// Largest chain factor applied during the turn
    pub chain_multiplier: f64,
    pub ultimate_combo_multiplier: u32,
    pub booster_multiplier: f64,
    /// Score after chain factors, before combo and booster factors
    pub raw_score: f64,
    pub total_score: u64,
    pub groups: usize,
    pub cascades: u32,
}

/// Chain multiplier for a cascade index: `floor(log2(i))`, 0 for index 0
pub fn chain_multiplier(cascade_index: u32) -> u32 {
    if cascade_index == 0 {
        0
    } else {
        cascade_index.ilog2()
    }
}

#[derive(Debug, Clone, Default)]
struct TurnAccumulator {
    base_score: u64,
    raw_score: f64,
    max_chain_factor: f64,
    ultimate_combo: bool,
    groups: usize,
    cascades: u32,
    earned_colors: Vec<DieColor>,
}

/// Running score, the active boosters and the breakdown history
#[derive(Debug, Clone, Default)]
pub struct ScoreManager {
    total: u64,
    history: Vec<ScoreBreakdown>,
    turn: Option<TurnAccumulator>,
    boosters: BoosterRegistry,
}

impl ScoreManager {
    pub fn new(chain_mode: ChainBonusMode) -> Self {
        Self {
            boosters: BoosterRegistry::new(chain_mode),
            ..Self::default()
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn history(&self) -> &[ScoreBreakdown] {
        &self.history
    }

    pub fn boosters(&self) -> &BoosterRegistry {
        &self.boosters
    }

    /// Registry access for the game loop to tick and expire boosters
    pub(crate) fn boosters_mut(&mut self) -> &mut BoosterRegistry {
        &mut self.boosters
    }

    pub fn turn_in_progress(&self) -> bool {
        self.turn.is_some()
    }

    /// Chain factor actually applied to a match at `cascade_index`: the
    /// initial match counts once; cascades use the log2 multiplier adjusted
    /// by chain boosters, never below 1
    pub fn chain_factor(&self, cascade_index: u32) -> f64 {
        if cascade_index == 0 {
            return 1.0;
        }
        let modified = self.boosters.apply_chain_bonus(chain_multiplier(cascade_index) as f64);
        modified.max(1.0)
    }

    /// Start accumulating a new turn, discarding any unfinished one
    pub fn begin_turn(&mut self) {
        self.turn = Some(TurnAccumulator::default());
    }

    /// Record the groups cleared at one cascade step
    pub fn record_matches(&mut self, cascade_index: u32, groups: &[MatchGroup]) {
        let factor = self.chain_factor(cascade_index);
        let turn = self.turn.get_or_insert_with(TurnAccumulator::default);
        turn.cascades = turn.cascades.max(cascade_index);
        turn.max_chain_factor = turn.max_chain_factor.max(factor);

        for group in groups {
            let base = group.base_score();
            turn.base_score += base;
            turn.raw_score += base as f64 * factor;
            turn.groups += 1;
            turn.ultimate_combo |= group.is_ultimate_combo();
            for color in group.booster_colors() {
                if !turn.earned_colors.contains(&color) {
                    turn.earned_colors.push(color);
                }
            }
        }
    }

    /// Close the current turn. Returns the breakdown (appended to the
    /// history) and the boosters earned during the turn, which activate
    /// only now and therefore apply from the next turn on.
    pub fn finish_turn(&mut self) -> (ScoreBreakdown, Vec<ColorBooster>) {
        let turn = self.turn.take().unwrap_or_default();
        let ultimate_combo_multiplier = if turn.ultimate_combo {
            ULTIMATE_COMBO_MULTIPLIER
        } else {
            1
        };
        let booster_multiplier = self.boosters.score_multiplier();
        let total_score =
            (turn.raw_score * ultimate_combo_multiplier as f64 * booster_multiplier).floor() as u64;

        let breakdown = ScoreBreakdown {
            base_score: turn.base_score,
            chain_multiplier: if turn.groups > 0 { turn.max_chain_factor } else { 0.0 },
            ultimate_combo_multiplier,
            booster_multiplier,
            raw_score: turn.raw_score,
            total_score,
            groups: turn.groups,
            cascades: turn.cascades,
        };
        self.total += total_score;
        self.history.push(breakdown.clone());

        let activated = turn
            .earned_colors
            .into_iter()
            .map(|color| self.boosters.activate(color))
            .collect();
        (breakdown, activated)
    }

    /// Drop an unfinished turn without scoring it
    pub fn abort_turn(&mut self) {
        self.turn = None;
    }
}
