//! Core types for flashcard application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LibraryError, Result};

/// Generate a fresh opaque deck id.
pub fn new_deck_id() -> String {
    format!("deck-{}", Uuid::new_v4())
}

/// Generate a fresh opaque card id.
pub fn new_card_id() -> String {
    format!("card-{}", Uuid::new_v4())
}

/// One question/answer unit.
///
/// `id` and `created_at` never change after creation; every other field is
/// replaced as a whole by [`Flashcard::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub is_coding: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Flashcard {
    /// Replace the editable content with the draft's content.
    pub fn apply(&mut self, draft: CardDraft) {
        self.front = draft.front;
        self.back = draft.back;
        self.explanation = draft.explanation;
        self.is_coding = draft.is_coding;
    }

    /// Draft prefilled with this card's content.
    pub fn to_draft(&self) -> CardDraft {
        CardDraft {
            front: self.front.clone(),
            back: self.back.clone(),
            explanation: self.explanation.clone(),
            is_coding: self.is_coding,
        }
    }
}

/// Named, ordered collection of flashcards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub title: String,
    pub cards: Vec<Flashcard>,
}

impl Deck {
    /// Create a deck with a fresh id. The title is trimmed and must not be blank.
    pub fn new(title: &str, cards: Vec<Flashcard>) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LibraryError::EmptyField { field: "title" });
        }
        Ok(Self {
            id: new_deck_id(),
            title: title.to_string(),
            cards,
        })
    }

    pub fn card(&self, card_id: &str) -> Option<&Flashcard> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut Flashcard> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }

    /// True when no two cards share an id.
    pub fn has_unique_card_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.cards.iter().all(|c| seen.insert(c.id.as_str()))
    }
}

/// Editable card content, committed atomically after validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub is_coding: bool,
}

impl CardDraft {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            ..Self::default()
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn coding(mut self, is_coding: bool) -> Self {
        self.is_coding = is_coding;
        self
    }

    /// Front and back are required; the explanation is optional.
    pub fn validate(&self) -> Result<()> {
        if self.front.trim().is_empty() {
            return Err(LibraryError::EmptyField { field: "front" });
        }
        if self.back.trim().is_empty() {
            return Err(LibraryError::EmptyField { field: "back" });
        }
        Ok(())
    }

    /// Turn the draft into a new card with a fresh id. Does not validate.
    pub fn into_card(self, created_at: DateTime<Utc>) -> Flashcard {
        Flashcard {
            id: new_card_id(),
            front: self.front,
            back: self.back,
            explanation: self.explanation,
            is_coding: self.is_coding,
            created_at,
        }
    }
}

/// Card record returned by the generation service. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCard {
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub is_coding: Option<bool>,
}

impl From<GeneratedCard> for CardDraft {
    fn from(g: GeneratedCard) -> Self {
        Self {
            front: g.front.unwrap_or_default(),
            back: g.back.unwrap_or_default(),
            explanation: g.explanation.unwrap_or_default(),
            is_coding: g.is_coding.unwrap_or(false),
        }
    }
}
