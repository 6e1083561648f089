//! Deck commands.

use crate::db::DeckStore;
use crate::state::AppState;
use flashcard_core::{CardDraft, Deck, DeckTarget, Library, LibraryError};

use super::CommandError;

/// One line of the deck list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSummary {
    pub id: String,
    pub title: String,
    pub card_count: usize,
}

impl From<&Deck> for DeckSummary {
    fn from(deck: &Deck) -> Self {
        Self {
            id: deck.id.clone(),
            title: deck.title.clone(),
            card_count: deck.cards.len(),
        }
    }
}

/// Find a deck by exact id, or by its 1-based position in the list.
pub fn resolve_deck_id(library: &Library, selector: &str) -> Result<String, CommandError> {
    let selector = selector.trim();
    if let Some(deck) = library.deck(selector) {
        return Ok(deck.id.clone());
    }
    selector
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| library.decks().get(i))
        .map(|d| d.id.clone())
        .ok_or_else(|| LibraryError::DeckNotFound(selector.to_string()).into())
}

/// List all decks, newest first.
pub fn list_decks<S: DeckStore>(state: &AppState<S>) -> Result<Vec<DeckSummary>, CommandError> {
    state.read(|lib| lib.decks().iter().map(DeckSummary::from).collect())
}

/// Get a full deck.
pub fn get_deck<S: DeckStore>(state: &AppState<S>, selector: &str) -> Result<Deck, CommandError> {
    state.read(|lib| -> Result<Deck, CommandError> {
        let id = resolve_deck_id(lib, selector)?;
        lib.deck(&id)
            .cloned()
            .ok_or_else(|| LibraryError::DeckNotFound(id).into())
    })?
}

/// Create a deck holding one first card.
pub fn create_deck<S: DeckStore>(
    state: &AppState<S>,
    title: &str,
    draft: CardDraft,
) -> Result<DeckSummary, CommandError> {
    let summary = state.update(|lib| {
        lib.add_card(DeckTarget::New { title }, draft)
            .map(DeckSummary::from)
    })?;
    tracing::info!(deck = %summary.id, "created deck");
    Ok(summary)
}

/// Append a card to an existing deck.
pub fn add_card<S: DeckStore>(
    state: &AppState<S>,
    selector: &str,
    draft: CardDraft,
) -> Result<DeckSummary, CommandError> {
    let id = state.read(|lib| resolve_deck_id(lib, selector))??;
    state.update(|lib| {
        lib.add_card(DeckTarget::Existing(&id), draft)
            .map(DeckSummary::from)
    })
}

pub fn rename_deck<S: DeckStore>(
    state: &AppState<S>,
    selector: &str,
    title: &str,
) -> Result<DeckSummary, CommandError> {
    let id = state.read(|lib| resolve_deck_id(lib, selector))??;
    state.update(|lib| {
        lib.rename_deck(&id, title)?;
        lib.deck(&id)
            .map(DeckSummary::from)
            .ok_or_else(|| LibraryError::DeckNotFound(id.clone()))
    })
}

/// Remove a deck and all of its cards.
pub fn delete_deck<S: DeckStore>(state: &AppState<S>, selector: &str) -> Result<Deck, CommandError> {
    let id = state.read(|lib| resolve_deck_id(lib, selector))??;
    let deck = state.update(|lib| lib.delete_deck(&id))?;
    tracing::info!(deck = %deck.id, cards = deck.cards.len(), "deleted deck");
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_state;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_state_lists_sample_deck() {
        let state = test_state();
        let decks = list_decks(&state).unwrap();
        assert_eq!(
            decks,
            vec![DeckSummary {
                id: "sample-1".to_string(),
                title: "Python Mastery".to_string(),
                card_count: 1,
            }]
        );
    }

    #[test]
    fn created_deck_goes_first() {
        let state = test_state();
        let created = create_deck(&state, " Rust ", CardDraft::new("Q", "A")).unwrap();

        assert_eq!(created.title, "Rust");
        assert_eq!(created.card_count, 1);
        assert_eq!(list_decks(&state).unwrap()[0].id, created.id);
    }

    #[test]
    fn create_rejects_blank_title_and_card() {
        let state = test_state();
        assert!(create_deck(&state, "  ", CardDraft::new("Q", "A")).is_err());
        assert!(create_deck(&state, "Rust", CardDraft::new("", "A")).is_err());
        assert_eq!(list_decks(&state).unwrap().len(), 1);
    }

    #[test]
    fn decks_resolve_by_id_or_position() {
        let state = test_state();
        let created = create_deck(&state, "Rust", CardDraft::new("Q", "A")).unwrap();

        assert_eq!(get_deck(&state, &created.id).unwrap().title, "Rust");
        assert_eq!(get_deck(&state, "1").unwrap().title, "Rust");
        assert_eq!(get_deck(&state, "2").unwrap().id, "sample-1");
        assert!(get_deck(&state, "0").is_err());
        assert!(get_deck(&state, "3").is_err());
        assert!(get_deck(&state, "nope").is_err());
    }

    #[test]
    fn add_card_appends() {
        let state = test_state();
        let summary = add_card(&state, "sample-1", CardDraft::new("Q", "A")).unwrap();
        assert_eq!(summary.card_count, 2);
        assert_eq!(get_deck(&state, "sample-1").unwrap().cards[1].front, "Q");
    }

    #[test]
    fn rename_trims_and_rejects_blank() {
        let state = test_state();
        let renamed = rename_deck(&state, "1", "  Python  ").unwrap();
        assert_eq!(renamed.title, "Python");

        assert!(rename_deck(&state, "1", " ").is_err());
        assert_eq!(get_deck(&state, "1").unwrap().title, "Python");
    }

    #[test]
    fn delete_removes_deck() {
        let state = test_state();
        let removed = delete_deck(&state, "sample-1").unwrap();
        assert_eq!(removed.title, "Python Mastery");
        assert!(list_decks(&state).unwrap().is_empty());
        assert!(delete_deck(&state, "sample-1").is_err());
    }
}
