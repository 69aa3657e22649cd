//! Notifications emitted by the game for rendering, audio and
//! leaderboard collaborators. Events are queued and drained by the caller;
//! nothing here calls back into the engine.

use crate::booster::{BoosterKind, ColorBooster};
use crate::die::DieColor;
use crate::game::Phase;
use crate::grid::Position;
use crate::match_group::SpecialEffect;
use crate::score::ScoreBreakdown;
use crate::shape::ShapeKind;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// The game wants a new piece from its source
    SpawnRequested,
    PieceSpawned { shape: ShapeKind },
    /// One die of a locked piece landed in the grid
    DieLocked { die_id: u32, position: Position },
    MatchFound {
        matched_value: u32,
        size: usize,
        effect: SpecialEffect,
        center: Position,
        ultimate_combo: bool,
    },
    CascadeStep { chain_index: u32, center: Position },
    WildSpawned { position: Position },
    ScoreDelta(ScoreBreakdown),
    PhaseChanged { from: Phase, to: Phase },
    BoosterActivated {
        color: DieColor,
        kind: BoosterKind,
        value: f64,
    },
    BoosterExpired { color: DieColor },
    /// A phase overran the timeout and the game was forced back to spawn
    PhaseTimeout { phase: Phase },
    /// The grid was trimmed to make room in a mode without game over
    GridTrimmed { rows: usize, removed: usize },
    GameOver { score: u64 },
}

impl GameEvent {
    pub(crate) fn booster_activated(booster: &ColorBooster) -> Self {
        GameEvent::BoosterActivated {
            color: booster.color,
            kind: booster.kind,
            value: booster.value,
        }
    }
}
