//! Study session state machine.
//!
//! A session walks the cards of one deck in stored order:
//!
//! ```text
//! Active(0) -advance-> Active(1) -> ... -> Active(N-1) -advance-> Complete
//! ```
//!
//! The session works on its own copy of the deck's cards. Mutations (edit,
//! delete) are applied to that copy and handed back as [`DeckCommand`]s for
//! the caller to forward to the deck store.

use crate::error::SessionError;
use crate::types::{CardDraft, Deck, Flashcard};

type Result<T> = std::result::Result<T, SessionError>;

/// Position of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active(usize),
    Complete,
}

/// Which side of the active card is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
}

/// Ephemeral per-card state, dropped whenever the session moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFace {
    pub side: Side,
    /// Answer typed into the code workspace of a coding card.
    pub answer_draft: String,
}

/// Request for the deck store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckCommand {
    UpdateCard { card_id: String, draft: CardDraft },
    DeleteCard { card_id: String },
}

/// Result of a confirmed delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub command: DeckCommand,
    /// The deleted card was the only one; the session is over.
    pub session_ended: bool,
}

/// How a session was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Abandoned,
    Finished { cards_studied: usize },
    DeckEmptied,
}

#[derive(Debug, Clone)]
pub struct StudySession {
    deck_id: String,
    cards: Vec<Flashcard>,
    state: SessionState,
    face: CardFace,
    ended: bool,
}

impl StudySession {
    /// Start at the first card. A deck without cards cannot be studied.
    pub fn start(deck: &Deck) -> Result<Self> {
        if deck.cards.is_empty() {
            return Err(SessionError::EmptyDeck);
        }
        Ok(Self {
            deck_id: deck.id.clone(),
            cards: deck.cards.clone(),
            state: SessionState::Active(0),
            face: CardFace::default(),
            ended: false,
        })
    }

    pub fn deck_id(&self) -> &str {
        &self.deck_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    /// True once the session has been ended by deleting its last card.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        match self.state {
            SessionState::Active(i) if !self.ended => self.cards.get(i),
            _ => None,
        }
    }

    pub fn face(&self) -> &CardFace {
        &self.face
    }

    /// One-based position and total, e.g. `(2, 5)` for "Card 2 / 5".
    pub fn position(&self) -> Option<(usize, usize)> {
        match self.state {
            SessionState::Active(i) if !self.ended => Some((i + 1, self.cards.len())),
            _ => None,
        }
    }

    /// Fraction of the deck reached so far, 1.0 on the last card.
    pub fn progress(&self) -> f64 {
        match self.state {
            SessionState::Active(i) if !self.ended => (i + 1) as f64 / self.cards.len() as f64,
            _ => 1.0,
        }
    }

    pub fn is_last(&self) -> bool {
        matches!(self.state, SessionState::Active(i) if i + 1 == self.cards.len())
    }

    fn active_index(&self) -> Result<usize> {
        match self.state {
            SessionState::Active(i) if !self.ended => Ok(i),
            _ => Err(SessionError::Finished),
        }
    }

    fn move_to(&mut self, state: SessionState) {
        self.state = state;
        self.face = CardFace::default();
    }

    pub fn advance(&mut self) -> Result<SessionState> {
        let i = self.active_index()?;
        if i + 1 < self.cards.len() {
            self.move_to(SessionState::Active(i + 1));
        } else {
            self.move_to(SessionState::Complete);
        }
        Ok(self.state)
    }

    /// Step back one card. On the first card this is a no-op.
    pub fn retreat(&mut self) -> Result<SessionState> {
        let i = self.active_index()?;
        if i > 0 {
            self.move_to(SessionState::Active(i - 1));
        }
        Ok(self.state)
    }

    pub fn flip(&mut self) -> Result<Side> {
        self.active_index()?;
        self.face.side = match self.face.side {
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        };
        Ok(self.face.side)
    }

    pub fn set_answer_draft(&mut self, answer: impl Into<String>) -> Result<()> {
        self.active_index()?;
        self.face.answer_draft = answer.into();
        Ok(())
    }

    pub fn abandon(self) -> SessionEnd {
        SessionEnd::Abandoned
    }

    /// Consume a completed session.
    pub fn finish(self) -> Result<SessionEnd> {
        match self.state {
            SessionState::Complete => Ok(SessionEnd::Finished {
                cards_studied: self.cards.len(),
            }),
            SessionState::Active(_) if self.ended => Ok(SessionEnd::DeckEmptied),
            SessionState::Active(_) => Err(SessionError::Finished),
        }
    }

    /// Draft prefilled with the active card's content.
    pub fn begin_edit(&self) -> Result<CardDraft> {
        let i = self.active_index()?;
        Ok(self.cards[i].to_draft())
    }

    /// Validate and apply an edit to the active card.
    pub fn commit_edit(&mut self, draft: CardDraft) -> Result<DeckCommand> {
        let i = self.active_index()?;
        draft.validate()?;

        let card = &mut self.cards[i];
        card.apply(draft.clone());
        Ok(DeckCommand::UpdateCard {
            card_id: card.id.clone(),
            draft,
        })
    }

    /// Delete the active card once `confirm` agrees.
    ///
    /// Returns `Ok(None)` when the user declines. Deleting the last card of a
    /// multi-card deck steps back first so the index stays valid; deleting
    /// the only card ends the session.
    pub fn delete_current<F>(&mut self, confirm: F) -> Result<Option<Deletion>>
    where
        F: FnOnce(&Flashcard) -> bool,
    {
        let i = self.active_index()?;
        if !confirm(&self.cards[i]) {
            return Ok(None);
        }

        if self.cards.len() == 1 {
            let card = self.cards.remove(0);
            self.ended = true;
            self.face = CardFace::default();
            return Ok(Some(Deletion {
                command: DeckCommand::DeleteCard { card_id: card.id },
                session_ended: true,
            }));
        }

        if i + 1 == self.cards.len() {
            self.retreat()?;
        }
        let card = self.cards.remove(i);
        self.face = CardFace::default();

        Ok(Some(Deletion {
            command: DeckCommand::DeleteCard { card_id: card.id },
            session_ended: false,
        }))
    }
}
