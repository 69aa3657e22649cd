//! Engine settings persisted as TOML
//!
//! Stored in ~/.config/dicefall/settings.toml (or platform equivalent)

use crate::booster::ChainBonusMode;
use crate::cascade::DEFAULT_MAX_CASCADES;
use crate::error::{EngineError, EngineResult};
use crate::mode::GameMode;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// All engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub game: GameSettings,
    pub timing: TimingSettings,
    pub cascade: CascadeSettings,
    pub zen: ZenSettings,
    pub logging: LoggingSettings,
}

/// Which game to start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub mode: GameMode,
    /// Fixed seed for the piece factory, random when absent
    pub seed: Option<u64>,
}

/// Phase timing in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Ceiling on any non-interactive phase before forcing a respawn
    pub phase_timeout_ms: u64,
    /// How long to wait for a requested piece before asking again
    pub spawn_grace_ms: u64,
    /// Time a grounded piece waits before locking
    pub lock_delay_ms: u64,
}

/// Cascade loop behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeSettings {
    pub max_cascades: u32,
    /// Wait for `notify_settled` after gravity moves dice
    pub await_settle: bool,
    /// Rescan only around the cells a cascade step touched
    pub region_rescan: bool,
    pub chain_bonus_mode: ChainBonusMode,
}

/// Rows trimmed when a zen grid fills up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZenSettings {
    pub first_clear_rows: usize,
    pub second_clear_rows: usize,
}

/// Log output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Medium,
            seed: None,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            phase_timeout_ms: 5000,
            spawn_grace_ms: 250,
            lock_delay_ms: 500,
        }
    }
}

impl Default for CascadeSettings {
    fn default() -> Self {
        Self {
            max_cascades: DEFAULT_MAX_CASCADES,
            await_settle: false,
            region_rescan: true,
            chain_bonus_mode: ChainBonusMode::Additive,
        }
    }
}

impl Default for ZenSettings {
    fn default() -> Self {
        Self {
            first_clear_rows: 5,
            second_clear_rows: 10,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "dicefall=info".to_string(),
        }
    }
}

impl TimingSettings {
    pub fn phase_timeout(&self) -> Duration {
        Duration::from_millis(self.phase_timeout_ms)
    }

    pub fn spawn_grace(&self) -> Duration {
        Duration::from_millis(self.spawn_grace_ms)
    }

    pub fn lock_delay(&self) -> Duration {
        Duration::from_millis(self.lock_delay_ms)
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "dicefall", "dicefall").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the config directory, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match Self::from_path(&path) {
            Ok(settings) => settings,
            Err(EngineError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring unreadable settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save settings to the config directory
    pub fn save(&self) -> EngineResult<()> {
        let path = Self::settings_path().ok_or_else(|| {
            EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine config directory",
            ))
        })?;
        self.save_to(&path)
    }

    /// Save settings to an explicit file, creating parent directories
    pub fn save_to(&self, path: &Path) -> EngineResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
