//! Interactive study loop.
//!
//! Keys (followed by Enter):
//! ```text
//! f  flip            n / Enter  next card     p  previous card
//! a  type an answer (coding cards)            e  edit card
//! d  delete card     q  quit                  ?  help
//! ```

mod prompt;

pub use prompt::Prompt;

use crate::commands::{apply_session_command, CommandError};
use crate::db::DeckStore;
use crate::display::Painter;
use crate::state::AppState;
use flashcard_core::{SessionEnd, SessionState, Side, StudySession};
use std::io::{BufRead, Write};

const PROGRESS_WIDTH: usize = 24;

const LAST_CARD_HINT: &str = "Last card: n completes the session.";

const HELP: &str = "f flip | n/Enter next | p previous | a answer (coding) | e edit | d delete | q quit";

/// One keyboard command of the study loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Flip,
    Next,
    Previous,
    Answer,
    Edit,
    Delete,
    Quit,
    Help,
    Unknown,
}

impl Key {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "n" | "next" => Self::Next,
            "f" | "flip" => Self::Flip,
            "p" | "prev" | "previous" => Self::Previous,
            "a" | "answer" => Self::Answer,
            "e" | "edit" => Self::Edit,
            "d" | "delete" => Self::Delete,
            "q" | "quit" | "exit" => Self::Quit,
            "?" | "h" | "help" => Self::Help,
            _ => Self::Unknown,
        }
    }
}

/// Drives one [`StudySession`] from line input until it ends.
///
/// Edits and deletions are forwarded to `state` as they happen, so quitting
/// half way keeps them.
pub struct StudyLoop<'a, S, R, W> {
    state: &'a AppState<S>,
    prompt: &'a mut Prompt<R, W>,
    painter: Painter,
    title: String,
}

impl<'a, S, R, W> StudyLoop<'a, S, R, W>
where
    S: DeckStore,
    R: BufRead,
    W: Write,
{
    pub fn new(
        state: &'a AppState<S>,
        prompt: &'a mut Prompt<R, W>,
        painter: Painter,
        title: impl Into<String>,
    ) -> Self {
        Self {
            state,
            prompt,
            painter,
            title: title.into(),
        }
    }

    pub fn run(mut self, mut session: StudySession) -> Result<SessionEnd, CommandError> {
        self.prompt.say(self.painter.dim(HELP))?;

        loop {
            if session.is_ended() {
                self.prompt.say("The deck has no cards left.")?;
                return Ok(session.finish()?);
            }
            if session.state() == SessionState::Complete {
                self.show_summary(&session)?;
                return Ok(session.finish()?);
            }

            self.show_card(&session)?;
            let Some(line) = self.prompt.ask("> ")? else {
                return Ok(session.abandon());
            };

            match Key::parse(&line) {
                Key::Next => {
                    session.advance()?;
                }
                Key::Previous => {
                    session.retreat()?;
                }
                Key::Flip => {
                    session.flip()?;
                }
                Key::Answer => self.type_answer(&mut session)?,
                Key::Edit => self.edit(&mut session)?,
                Key::Delete => self.delete(&mut session)?,
                Key::Quit => return Ok(session.abandon()),
                Key::Help => self.prompt.say(HELP)?,
                Key::Unknown => self
                    .prompt
                    .say(format!("Unknown command {:?}, ? for help", line.trim()))?,
            }
        }
    }

    fn show_card(&mut self, session: &StudySession) -> Result<(), CommandError> {
        let (Some((index, total)), Some(card)) = (session.position(), session.current_card()) else {
            return Ok(());
        };
        let painter = self.painter;
        let face = session.face();

        self.prompt.say("")?;
        self.prompt.say(format!(
            "{}  {}",
            painter.bold(&self.title),
            painter.dim(&format!("Card {index} / {total}"))
        ))?;
        self.prompt.say(painter.progress_bar(session.progress(), PROGRESS_WIDTH))?;
        self.prompt.say("")?;

        match face.side {
            Side::Front => {
                self.prompt.say(painter.accent("QUESTION"))?;
                for line in painter.markdown(&card.front) {
                    self.prompt.say(line)?;
                }
                if card.is_coding {
                    self.prompt.say("")?;
                    if face.answer_draft.is_empty() {
                        self.prompt.say(painter.dim("(coding card: press a to write your answer)"))?;
                    } else {
                        self.prompt.say(painter.dim("Your answer:"))?;
                        for line in face.answer_draft.lines() {
                            self.prompt.say(format!("    {line}"))?;
                        }
                    }
                }
            }
            Side::Back => {
                if card.is_coding && !face.answer_draft.is_empty() {
                    self.prompt.say(painter.accent("YOUR ANSWER"))?;
                    for line in face.answer_draft.lines() {
                        self.prompt.say(format!("    {line}"))?;
                    }
                    self.prompt.say("")?;
                }
                self.prompt.say(painter.accent("ANSWER"))?;
                for line in painter.markdown(&card.back) {
                    self.prompt.say(line)?;
                }
                if !card.explanation.trim().is_empty() {
                    self.prompt.say("")?;
                    self.prompt.say(painter.accent("EXPLANATION"))?;
                    for line in painter.markdown(&card.explanation) {
                        self.prompt.say(line)?;
                    }
                }
            }
        }
        if session.is_last() {
            self.prompt.say("")?;
            self.prompt.say(painter.dim(LAST_CARD_HINT))?;
        }
        Ok(())
    }

    fn show_summary(&mut self, session: &StudySession) -> Result<(), CommandError> {
        let total = session.card_count();
        self.prompt.say("")?;
        self.prompt.say(self.painter.bold("Session Complete!"))?;
        self.prompt.say(format!(
            "You've reviewed all {total} {} in \"{}\".",
            if total == 1 { "card" } else { "cards" },
            self.title
        ))?;
        Ok(())
    }

    fn type_answer(&mut self, session: &mut StudySession) -> Result<(), CommandError> {
        if !session.current_card().is_some_and(|c| c.is_coding) {
            self.prompt.say("Only coding cards take a typed answer.")?;
            return Ok(());
        }
        let answer = self.prompt.ask_multiline("Your answer")?;
        session.set_answer_draft(answer)?;
        Ok(())
    }

    fn edit(&mut self, session: &mut StudySession) -> Result<(), CommandError> {
        let current = session.begin_edit()?;
        let draft = self.prompt.edit_card(current)?;

        match session.commit_edit(draft) {
            Ok(command) => {
                apply_session_command(self.state, session.deck_id(), command)?;
                self.prompt.say("Card updated.")?;
            }
            Err(e) => self.prompt.say(self.painter.error(&format!("Not saved: {e}")))?,
        }
        Ok(())
    }

    fn delete(&mut self, session: &mut StudySession) -> Result<(), CommandError> {
        let prompt = &mut *self.prompt;
        let deletion = session.delete_current(|_| {
            prompt.confirm("Delete this card?").unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not read confirmation, keeping card");
                false
            })
        })?;

        if let Some(deletion) = deletion {
            apply_session_command(self.state, session.deck_id(), deletion.command)?;
            self.prompt.say("Card deleted.")?;
        }
        Ok(())
    }
}
