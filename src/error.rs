//! Error types
//!
//! Only construction failures ever reach the caller. Storage and collaborator
//! errors are logged and swallowed by the orchestrator.

use thiserror::Error;

/// Fatal errors raised while building a game
#[derive(Error, Debug)]
pub enum GameError {
    /// The balance table makes no sense (zero lanes, inverted ranges, ...)
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    /// The tuning override file could not be parsed
    #[error("failed to parse tuning: {0}")]
    TuningParse(#[from] serde_json::Error),

    /// A required host handle (window, document, canvas) is missing
    #[error("missing host element: {0}")]
    MissingElement(&'static str),
}

/// Errors from a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend is not reachable at all (no window, private mode, ...)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("save record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Stored data has an envelope version this build does not understand
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// A fire-and-forget collaborator (audio, achievements) failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("audio playback rejected: {0}")]
    Audio(String),

    #[error("achievement check failed: {0}")]
    Achievements(String),
}
