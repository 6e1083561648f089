//! Study session commands.

use crate::db::DeckStore;
use crate::state::AppState;
use flashcard_core::{DeckCommand, StudySession};

use super::deck::get_deck;
use super::CommandError;

/// Start a session over a snapshot of the deck's cards.
pub fn start_study<S: DeckStore>(
    state: &AppState<S>,
    selector: &str,
) -> Result<StudySession, CommandError> {
    let deck = get_deck(state, selector)?;
    let session = StudySession::start(&deck)?;
    tracing::debug!(deck = %deck.id, cards = session.card_count(), "study session started");
    Ok(session)
}

/// Persist an edit or deletion made during a session.
pub fn apply_session_command<S: DeckStore>(
    state: &AppState<S>,
    deck_id: &str,
    command: DeckCommand,
) -> Result<(), CommandError> {
    state.update(|lib| lib.apply(deck_id, command))
}
