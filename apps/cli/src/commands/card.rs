//! Card commands outside of a study session.

use crate::db::DeckStore;
use crate::state::AppState;
use flashcard_core::{CardDraft, Deck, Flashcard, LibraryError};

use super::deck::resolve_deck_id;
use super::CommandError;

/// Find a card by exact id, or by its 1-based position in the deck.
pub fn resolve_card_id(deck: &Deck, selector: &str) -> Result<String, CommandError> {
    let selector = selector.trim();
    if let Some(card) = deck.card(selector) {
        return Ok(card.id.clone());
    }
    selector
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| deck.cards.get(i))
        .map(|c| c.id.clone())
        .ok_or_else(|| LibraryError::CardNotFound(selector.to_string()).into())
}

fn resolve<S: DeckStore>(
    state: &AppState<S>,
    deck: &str,
    card: &str,
) -> Result<(String, String), CommandError> {
    state.read(|lib| -> Result<(String, String), CommandError> {
        let deck_id = resolve_deck_id(lib, deck)?;
        let deck = lib
            .deck(&deck_id)
            .ok_or_else(|| LibraryError::DeckNotFound(deck_id.clone()))?;
        let card_id = resolve_card_id(deck, card)?;
        Ok((deck_id, card_id))
    })?
}

/// Replace a card's content; id and creation time are kept.
pub fn update_card<S: DeckStore>(
    state: &AppState<S>,
    deck: &str,
    card: &str,
    draft: CardDraft,
) -> Result<Flashcard, CommandError> {
    let (deck_id, card_id) = resolve(state, deck, card)?;
    state.update(|lib| {
        lib.update_card(&deck_id, &card_id, draft)?;
        lib.deck(&deck_id)
            .and_then(|d| d.card(&card_id))
            .cloned()
            .ok_or_else(|| LibraryError::CardNotFound(card_id.clone()))
    })
}

pub fn delete_card<S: DeckStore>(
    state: &AppState<S>,
    deck: &str,
    card: &str,
) -> Result<Flashcard, CommandError> {
    let (deck_id, card_id) = resolve(state, deck, card)?;
    let removed = state.update(|lib| lib.delete_card(&deck_id, &card_id))?;
    tracing::info!(deck = %deck_id, card = %removed.id, "deleted card");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{get_deck, test_state};
    use pretty_assertions::assert_eq;

    #[test]
    fn update_replaces_content_and_keeps_identity() {
        let state = test_state();
        let before = get_deck(&state, "1").unwrap().cards[0].clone();

        let after = update_card(&state, "1", "1", CardDraft::new("New Q", "New A")).unwrap();

        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.front, "New Q");
        assert_eq!(after.explanation, "");
        assert!(!after.is_coding);
    }

    #[test]
    fn update_rejects_blank_answer() {
        let state = test_state();
        let before = get_deck(&state, "1").unwrap();
        assert!(update_card(&state, "1", "c1", CardDraft::new("Q", " ")).is_err());
        assert_eq!(get_deck(&state, "1").unwrap(), before);
    }

    #[test]
    fn delete_card_by_id() {
        let state = test_state();
        let removed = delete_card(&state, "sample-1", "c1").unwrap();
        assert_eq!(removed.id, "c1");
        assert!(get_deck(&state, "1").unwrap().cards.is_empty());
        assert!(delete_card(&state, "sample-1", "c1").is_err());
    }
}
