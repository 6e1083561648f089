//! Error types for flashcard-core.

use thiserror::Error;

/// Result type alias using LibraryError.
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Errors raised by library operations (create, edit, import, export).
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("deck not found: {0}")]
    DeckNotFound(String),

    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("invalid import: {0}")]
    InvalidImport(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the study session state machine.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no cards to study in this deck")]
    EmptyDeck,

    #[error("study session already finished")]
    Finished,

    #[error(transparent)]
    Invalid(#[from] LibraryError),
}
