//! Core flashcard library shared by the terminal client and its tests.
//!
//! Provides:
//! - Markdown-subset renderer for card text (headings, lists, quotes, rules, code)
//! - Study session state machine (advance, retreat, flip, edit, delete)
//! - Deck library operations, including JSON import and export
//! - Shared types (Flashcard, Deck, CardDraft, GeneratedCard)

pub mod error;
pub mod library;
pub mod render;
pub mod session;
pub mod types;

pub use error::{LibraryError, Result, SessionError};
pub use library::{parse_import, title_from_topic, DeckTarget, ImportBatch, ImportReport, Library};
pub use render::{render, Block, Inline};
pub use session::{CardFace, DeckCommand, Deletion, SessionEnd, SessionState, Side, StudySession};
pub use types::{CardDraft, Deck, Flashcard, GeneratedCard};
