//! Command handlers behind the CLI subcommands.

pub mod card;
pub mod deck;
pub mod generate;
pub mod study;
pub mod transfer;

pub use card::{delete_card, update_card};
pub use deck::{add_card, create_deck, delete_deck, get_deck, list_decks, rename_deck, DeckSummary};
pub use generate::generate_cards;
pub use study::{apply_session_command, start_study};
pub use transfer::{export_library, import_batch, read_import, DEFAULT_EXPORT_FILE};

/// Error returned by every command, flattened to a message for display.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CommandError {
    pub message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn database(e: impl std::fmt::Display) -> Self {
        Self::new(format!("Database error: {}", e))
    }
}

impl From<crate::db::DbError> for CommandError {
    fn from(e: crate::db::DbError) -> Self {
        Self::database(e)
    }
}

impl From<flashcard_core::LibraryError> for CommandError {
    fn from(e: flashcard_core::LibraryError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<flashcard_core::SessionError> for CommandError {
    fn from(e: flashcard_core::SessionError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<crate::generate::GenerateError> for CommandError {
    fn from(e: crate::generate::GenerateError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<std::io::Error> for CommandError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> crate::state::AppState {
    let repo = crate::db::SqliteRepository::open_in_memory().unwrap();
    crate::state::AppState::load(repo).unwrap()
}
