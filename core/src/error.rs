use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board must have at least one row and one column")]
    EmptyBoard,
    #[error("Board must contain at least one mine")]
    NoMines,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board preset table is empty or has no catch-all entry")]
    NoPresets,
    #[error("Mine density must be between 0 and 1")]
    InvalidDensity,
    #[error("Maximum game time must be positive")]
    InvalidMaxTime,
}

pub type Result<T> = core::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid settings: {0}")]
    Invalid(#[from] GameError),
}
