//! AI generation command.

use crate::db::DeckStore;
use crate::generate::{validate_request, CardGenerator};
use crate::state::AppState;
use flashcard_core::DeckTarget;

use super::deck::{resolve_deck_id, DeckSummary};
use super::CommandError;

/// Generate `count` cards for `topic` into a new deck (named after the
/// topic) or, when `deck` is given, append them to that deck.
///
/// Nothing is written unless the generator returns at least one card.
pub async fn generate_cards<S, G>(
    state: &AppState<S>,
    generator: &G,
    topic: &str,
    count: u32,
    deck: Option<&str>,
) -> Result<DeckSummary, CommandError>
where
    S: DeckStore,
    G: CardGenerator,
{
    validate_request(topic, count)?;
    let existing = match deck {
        Some(selector) => Some(state.read(|lib| resolve_deck_id(lib, selector))??),
        None => None,
    };

    tracing::info!(topic, count, "generating cards");
    let cards = state
        .generation
        .run(topic, generator.generate(topic, count))
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "generation failed"))?;
    tracing::info!(received = cards.len(), "generation complete");

    state.update(|lib| {
        let target = match existing.as_deref() {
            Some(id) => DeckTarget::Existing(id),
            None => DeckTarget::New { title: topic },
        };
        lib.add_generated(target, topic, cards)
            .map(DeckSummary::from)
    })
}
