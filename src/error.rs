//! Error types shared by the engine

/// Errors raised by grid, piece, mode and settings operations.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Coordinates outside the 10x20 grid
    #[error("position ({x}, {y}) is outside the grid")]
    InvalidPosition { x: i32, y: i32 },

    /// Movement, rotation or placement would overlap dice or leave the bounds
    #[error("piece collides at ({x}, {y})")]
    CollisionRejected { x: i32, y: i32 },

    /// A locked piece could not be transferred into the grid
    #[error("grid is full: piece could not be placed")]
    PlacementFailure,

    /// Shape name with no definition
    #[error("unknown piece shape: {0}")]
    UnknownShape(String),

    /// Mode name with no configuration
    #[error("unknown game mode: {0}")]
    UnknownMode(String),

    /// Die with an unsupported side count or a face outside 1..=sides
    #[error("invalid die: face {face} on a d{sides}")]
    InvalidDie { sides: u32, face: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("settings serialize error: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;
