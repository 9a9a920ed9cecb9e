//! Centralized error types for the game.
//!
//! Configuration problems are fatal and surface before the game loop starts.
//! Persistence problems are recovered by the caller, which falls back to a fresh record.

use std::io;

/// Main error type for the game.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Error type for maze markup parsing.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown character {character:?} at ({x}, {y})")]
    UnknownCharacter { character: char, x: usize, y: usize },
    #[error("Maze must be at least {min}x{min}, found {width}x{height}")]
    TooSmall { width: usize, height: usize, min: usize },
    #[error("Maze row {row} has width {found}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("Duplicate spawn marker {0:?}")]
    DuplicateSpawn(char),
}

/// Errors raised while loading or validating the level/difficulty configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Configuration defines no levels")]
    NoLevels,

    #[error("Level {level:?} references unknown difficulty {difficulty:?}")]
    UnknownDifficulty { level: String, difficulty: String },

    #[error("Difficulty {name:?} is invalid: {reason}")]
    InvalidDifficulty { name: String, reason: String },

    #[error("Level {level:?} has an invalid maze: {source}")]
    InvalidMaze {
        level: String,
        #[source]
        source: ParseError,
    },

    #[error("Level {level:?} references unknown badge set {badges:?}")]
    UnknownBadges { level: String, badges: String },

    #[error("Badge {name:?} must be a single character, found {found:?}")]
    InvalidBadge { name: String, found: String },

    #[error("Configuration file {0} does not exist")]
    Missing(std::path::PathBuf),

    #[error("Failed to write configuration: {0}")]
    Write(#[from] io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Load(Box::new(error))
    }
}

/// Errors related to the session record store. Callers treat every variant as "no record".
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("No save location available")]
    Unavailable,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Save file is truncated")]
    Truncated,

    #[error("Save file failed its integrity check")]
    Integrity,

    #[error("Save file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
