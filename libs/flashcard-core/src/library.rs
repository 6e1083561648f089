//! The deck library: every deck the user owns, newest first.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{LibraryError, Result};
use crate::session::DeckCommand;
use crate::types::{new_deck_id, CardDraft, Deck, Flashcard, GeneratedCard};

/// Longest deck title derived from a generation topic, in characters.
pub const TOPIC_TITLE_LIMIT: usize = 30;

const SAMPLE_EXPLANATION: &str = r#"### Core Logic
The goal is to extract every unique character across multiple strings and present them in a standard alphabetical order.

### Step-by-Step Breakdown
- **Join**: `"".join(words)` merges all strings in the list into one.
- **Set**: `set(...)` cast removes all duplicates (Sets only store unique elements).
- **Sort**: `sorted(...)` takes the unique characters and arranges them.

---

> **Example Case**:
> Input: `["apple", "pear"]`
> Result: `['a', 'e', 'l', 'p', 'r']`

### Performance Tip
Using `set` is significantly faster than manually iterating and checking for uniqueness in a list."#;

/// Where new cards go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckTarget<'a> {
    Existing(&'a str),
    New { title: &'a str },
}

/// Decks accepted from an import file, not yet added to the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBatch {
    pub decks: Vec<Deck>,
    /// Array elements that were not usable decks.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    /// Imported decks whose id clashed and was replaced.
    pub reassigned_ids: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Library {
    decks: Vec<Deck>,
}

impl Library {
    pub fn new(decks: Vec<Deck>) -> Self {
        Self { decks }
    }

    /// Library seeded for a first run.
    pub fn sample() -> Self {
        let card = Flashcard {
            id: "c1".to_string(),
            front: "Write the code to create a sorted vocabulary of unique characters from a list of strings named `words`.".to_string(),
            back: r#"chars = sorted(list(set("".join(words))))"#.to_string(),
            explanation: SAMPLE_EXPLANATION.to_string(),
            is_coding: true,
            created_at: Utc::now(),
        };
        Self::new(vec![Deck {
            id: "sample-1".to_string(),
            title: "Python Mastery".to_string(),
            cards: vec![card],
        }])
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.decks)?)
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    pub fn deck(&self, deck_id: &str) -> Option<&Deck> {
        self.decks.iter().find(|d| d.id == deck_id)
    }

    fn deck_mut(&mut self, deck_id: &str) -> Result<&mut Deck> {
        self.decks
            .iter_mut()
            .find(|d| d.id == deck_id)
            .ok_or_else(|| LibraryError::DeckNotFound(deck_id.to_string()))
    }

    fn deck_index(&self, deck_id: &str) -> Result<usize> {
        self.decks
            .iter()
            .position(|d| d.id == deck_id)
            .ok_or_else(|| LibraryError::DeckNotFound(deck_id.to_string()))
    }

    /// Append cards to an existing deck or create a new deck at the front.
    fn insert_cards(&mut self, target: DeckTarget<'_>, cards: Vec<Flashcard>) -> Result<&Deck> {
        match target {
            DeckTarget::Existing(deck_id) => {
                let index = self.deck_index(deck_id)?;
                self.decks[index].cards.extend(cards);
                Ok(&self.decks[index])
            }
            DeckTarget::New { title } => {
                let deck = Deck::new(title, cards)?;
                self.decks.insert(0, deck);
                Ok(&self.decks[0])
            }
        }
    }

    /// Add one manually written card.
    pub fn add_card(&mut self, target: DeckTarget<'_>, draft: CardDraft) -> Result<&Deck> {
        draft.validate()?;
        if let DeckTarget::New { title } = target {
            if title.trim().is_empty() {
                return Err(LibraryError::EmptyField { field: "title" });
            }
        }
        let card = draft.into_card(Utc::now());
        self.insert_cards(target, vec![card])
    }

    /// Add cards returned by the generation service for `topic`.
    ///
    /// `DeckTarget::New` ignores its title and names the deck after the topic.
    pub fn add_generated(
        &mut self,
        target: DeckTarget<'_>,
        topic: &str,
        generated: Vec<GeneratedCard>,
    ) -> Result<&Deck> {
        let now = Utc::now();
        let cards = generated
            .into_iter()
            .map(|g| CardDraft::from(g).into_card(now))
            .collect();

        match target {
            DeckTarget::Existing(_) => self.insert_cards(target, cards),
            DeckTarget::New { .. } => {
                let title = title_from_topic(topic);
                self.insert_cards(DeckTarget::New { title: &title }, cards)
            }
        }
    }

    pub fn rename_deck(&mut self, deck_id: &str, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LibraryError::EmptyField { field: "title" });
        }
        self.deck_mut(deck_id)?.title = title.to_string();
        Ok(())
    }

    pub fn delete_deck(&mut self, deck_id: &str) -> Result<Deck> {
        let index = self.deck_index(deck_id)?;
        Ok(self.decks.remove(index))
    }

    /// Replace a card's content. `id` and `created_at` are kept.
    pub fn update_card(&mut self, deck_id: &str, card_id: &str, draft: CardDraft) -> Result<()> {
        draft.validate()?;
        let card = self
            .deck_mut(deck_id)?
            .card_mut(card_id)
            .ok_or_else(|| LibraryError::CardNotFound(card_id.to_string()))?;
        card.apply(draft);
        Ok(())
    }

    pub fn delete_card(&mut self, deck_id: &str, card_id: &str) -> Result<Flashcard> {
        let deck = self.deck_mut(deck_id)?;
        let index = deck
            .cards
            .iter()
            .position(|c| c.id == card_id)
            .ok_or_else(|| LibraryError::CardNotFound(card_id.to_string()))?;
        Ok(deck.cards.remove(index))
    }

    /// Apply a request emitted by a study session on `deck_id`.
    pub fn apply(&mut self, deck_id: &str, command: DeckCommand) -> Result<()> {
        match command {
            DeckCommand::UpdateCard { card_id, draft } => self.update_card(deck_id, &card_id, draft),
            DeckCommand::DeleteCard { card_id } => self.delete_card(deck_id, &card_id).map(|_| ()),
        }
    }

    /// Put imported decks in front of the existing ones, keeping their order.
    ///
    /// Ids that already exist (or repeat within the batch) are replaced so
    /// deck ids stay unique; content is never merged.
    pub fn prepend(&mut self, batch: ImportBatch) -> ImportReport {
        let mut seen: HashSet<String> = self.decks.iter().map(|d| d.id.clone()).collect();
        let mut reassigned_ids = 0;
        let mut decks = batch.decks;

        for deck in &mut decks {
            if deck.id.trim().is_empty() || !seen.insert(deck.id.clone()) {
                deck.id = new_deck_id();
                seen.insert(deck.id.clone());
                reassigned_ids += 1;
            }
        }

        let report = ImportReport {
            imported: decks.len(),
            skipped: batch.skipped,
            reassigned_ids,
        };
        decks.append(&mut self.decks);
        self.decks = decks;
        report
    }

    /// Parse and add an import file in one step.
    pub fn import_json(&mut self, content: &str) -> Result<ImportReport> {
        let batch = parse_import(content)?;
        Ok(self.prepend(batch))
    }
}

/// Validate an import file without touching any library.
///
/// The top level must be a JSON array. Each element is kept if it is a deck
/// with a non-blank title and unique card ids; anything else is counted in
/// `skipped`.
pub fn parse_import(content: &str) -> Result<ImportBatch> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Array(items) = value else {
        return Err(LibraryError::InvalidImport(
            "expected a JSON array of decks".to_string(),
        ));
    };

    let mut decks = Vec::with_capacity(items.len());
    let mut skipped = 0;

    for item in items {
        match serde_json::from_value::<Deck>(item) {
            Ok(deck) if !deck.title.trim().is_empty() && deck.has_unique_card_ids() => {
                decks.push(deck)
            }
            _ => skipped += 1,
        }
    }

    Ok(ImportBatch { decks, skipped })
}

/// Deck title for a generated deck: the topic, cut to
/// [`TOPIC_TITLE_LIMIT`] characters with an ellipsis.
pub fn title_from_topic(topic: &str) -> String {
    let topic = topic.trim();
    if topic.chars().count() > TOPIC_TITLE_LIMIT {
        let head: String = topic.chars().take(TOPIC_TITLE_LIMIT).collect();
        format!("{head}...")
    } else {
        topic.to_string()
    }
}
