/// Core error type for the simulation.
///
/// Recoverable in-game conditions (no ammo, full pack, cancelled targeting)
/// never show up here; they are reported through the message log instead.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A snapshot refers to entities or tiles that do not exist
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Level generation broke one of its invariants
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A scripted or remote command could not be understood
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Result type used throughout the crate.
pub type GameResult<T> = Result<T, GameError>;
