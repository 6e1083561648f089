//! Line-oriented input over any reader/writer pair.

use flashcard_core::CardDraft;
use std::io::{self, BufRead, Write};

/// Ends multi-line input when entered alone on a line.
pub const END_OF_TEXT: &str = ".";

/// Entered alone as a new value, empties the field.
pub const CLEAR_FIELD: &str = "-";

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, line: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", line.as_ref())
    }

    /// Read one line without its line ending. `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Read lines until a lone [`END_OF_TEXT`] or end of input.
    pub fn ask_multiline(&mut self, label: &str) -> io::Result<String> {
        writeln!(
            self.output,
            "{label} (finish with a line containing only \"{END_OF_TEXT}\")"
        )?;
        self.output.flush()?;

        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            if line == END_OF_TEXT {
                break;
            }
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    /// Multi-line edit of an existing value. Empty input keeps `current`,
    /// a lone [`CLEAR_FIELD`] empties it.
    pub fn edit_multiline(&mut self, label: &str, current: &str) -> io::Result<String> {
        writeln!(self.output, "{label} [current: {}]", summarize(current))?;
        let value = self.ask_multiline(&format!(
            "  new value, empty to keep, \"{CLEAR_FIELD}\" to clear"
        ))?;
        Ok(match value.trim() {
            "" => current.to_string(),
            CLEAR_FIELD => String::new(),
            _ => value,
        })
    }

    /// Yes/no edit of a flag; anything else keeps `current`.
    pub fn edit_flag(&mut self, question: &str, current: bool) -> io::Result<bool> {
        let shown = if current { "yes" } else { "no" };
        let answer = self.ask(&format!("{question} [y/n, Enter keeps {shown}] "))?;
        Ok(
            match answer.as_deref().map(|a| a.trim().to_ascii_lowercase()).as_deref() {
                Some("y" | "yes") => true,
                Some("n" | "no") => false,
                _ => current,
            },
        )
    }

    /// Walk every field of a card, starting from `current`.
    pub fn edit_card(&mut self, current: CardDraft) -> io::Result<CardDraft> {
        Ok(CardDraft {
            front: self.edit_multiline("Front", &current.front)?,
            back: self.edit_multiline("Back", &current.back)?,
            explanation: self.edit_multiline("Explanation", &current.explanation)?,
            is_coding: self.edit_flag("Coding card?", current.is_coding)?,
        })
    }

    /// Yes/no question; anything but `y`/`yes` (or end of input) is no.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{question} [y/N] "))?;
        Ok(matches!(
            answer.as_deref().map(|a| a.trim().to_ascii_lowercase()).as_deref(),
            Some("y" | "yes")
        ))
    }
}

fn summarize(text: &str) -> String {
    let first = text.lines().next().unwrap_or("");
    let more = text.lines().count() > 1;
    let mut head: String = first.chars().take(40).collect();
    if more || first.chars().count() > 40 {
        head.push_str("...");
    }
    head
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prompt(input: &str) -> Prompt<&[u8], Vec<u8>> {
        Prompt::new(input.as_bytes(), Vec::new())
    }

    #[test]
    fn ask_strips_line_endings_and_reports_eof() {
        let mut p = prompt("one\r\ntwo");
        assert_eq!(p.ask("> ").unwrap().as_deref(), Some("one"));
        assert_eq!(p.ask("> ").unwrap().as_deref(), Some("two"));
        assert_eq!(p.ask("> ").unwrap(), None);
    }

    #[test]
    fn multiline_stops_at_dot() {
        let mut p = prompt("def f():\n    return 1\n.\nafter\n");
        assert_eq!(p.ask_multiline("Answer").unwrap(), "def f():\n    return 1");
        assert_eq!(p.read_line().unwrap().as_deref(), Some("after"));
    }

    #[test]
    fn multiline_stops_at_eof() {
        let mut p = prompt("a\nb");
        assert_eq!(p.ask_multiline("Answer").unwrap(), "a\nb");
    }

    #[test]
    fn edit_keeps_current_on_empty_input() {
        let mut p = prompt(".\nnew\n.\n");
        assert_eq!(p.edit_multiline("Front", "old").unwrap(), "old");
        assert_eq!(p.edit_multiline("Front", "old").unwrap(), "new");
    }

    #[test]
    fn edit_clears_on_dash() {
        let mut p = prompt("-\n.\n");
        assert_eq!(p.edit_multiline("Explanation", "old").unwrap(), "");
    }

    #[test]
    fn edit_flag_keeps_current_unless_answered() {
        let mut p = prompt("\nn\ny\nmaybe\n");
        assert!(p.edit_flag("Coding?", true).unwrap());
        assert!(!p.edit_flag("Coding?", true).unwrap());
        assert!(p.edit_flag("Coding?", false).unwrap());
        assert!(!p.edit_flag("Coding?", false).unwrap());
        assert!(p.edit_flag("Coding?", true).unwrap());
    }

    #[test]
    fn edit_card_replaces_every_field() {
        let current = CardDraft::new("Q", "A").with_explanation("why").coding(true);
        let mut p = prompt("New Q\n.\n.\n-\n.\nn\n");

        let draft = p.edit_card(current).unwrap();

        assert_eq!(draft, CardDraft::new("New Q", "A"));
    }

    #[test]
    fn confirm_defaults_to_no() {
        let mut p = prompt("y\nYES\nn\n\n");
        assert!(p.confirm("Delete?").unwrap());
        assert!(p.confirm("Delete?").unwrap());
        assert!(!p.confirm("Delete?").unwrap());
        assert!(!p.confirm("Delete?").unwrap());
        assert!(!p.confirm("Delete?").unwrap());
    }

    #[test]
    fn summarize_shortens_long_values() {
        assert_eq!(summarize("short"), "short");
        assert_eq!(summarize("line one\nline two"), "line one...");
        assert_eq!(summarize(&"x".repeat(50)), format!("{}...", "x".repeat(40)));
    }
}
