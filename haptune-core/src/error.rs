//! Error types for haptune-core

use thiserror::Error;

/// Result type alias for haptune-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing, synthesising or exporting signals
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// WAV export error
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Session or config (de)serialisation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A signal file could not be understood
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Not enough points: at least {needed} required, found {found}")]
    NotEnoughPoints { needed: usize, found: usize },

    /// Spline fitting needs strictly increasing x values
    #[error("Sample positions must be strictly increasing")]
    NonIncreasing,

    #[error("Invalid factor {factor} for {available} points")]
    InvalidFactor { factor: usize, available: usize },

    #[error("No original points available to downsample")]
    NoOriginalPoints,

    #[error("No frequencies selected for vibration")]
    NoTones,

    /// An export or preview needs a vibration that has not been generated
    #[error("No vibration generated")]
    NoVibration,

    #[error("Signal too short: {samples} samples")]
    SignalTooShort { samples: usize },

    #[error("Invalid axis setting: {0}")]
    InvalidAxis(String),

    /// Audio device or stream error
    #[error("Audio error: {0}")]
    Audio(String),
}
