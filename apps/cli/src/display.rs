//! Terminal rendering of card text.

use crossterm::style::{StyledContent, Stylize};
use flashcard_core::{render, Block, Inline};
use std::io::IsTerminal;

const RULE_WIDTH: usize = 40;
const CODE_INDENT: &str = "    ";

/// Turns rendered blocks into printable lines, with or without ANSI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Colour only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self::new(std::io::stdout().is_terminal() && !no_color)
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint<'a>(
        &self,
        text: &'a str,
        style: impl FnOnce(&'a str) -> StyledContent<&'a str>,
    ) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(text, |t| t.bold())
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(text, |t| t.dim())
    }

    pub fn accent(&self, text: &str) -> String {
        self.paint(text, |t| t.cyan().bold())
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, |t| t.red().bold())
    }

    /// Render markdown-subset text straight to lines.
    pub fn markdown(&self, text: &str) -> Vec<String> {
        render(text).iter().flat_map(|b| self.block(b)).collect()
    }

    pub fn block(&self, block: &Block) -> Vec<String> {
        match block {
            Block::Paragraph(runs) => vec![self.inline(runs)],
            Block::Heading { level, runs } => {
                let text: String = runs.iter().map(Inline::text).collect();
                let line = match level {
                    1 => self.paint(&text, |t| t.bold().underlined()),
                    2 => self.bold(&text),
                    _ => self.accent(&text),
                };
                vec![line]
            }
            Block::ListItem(runs) => vec![format!("  • {}", self.inline(runs))],
            Block::Blockquote(runs) => {
                let text = self.inline(runs);
                vec![format!("  {} {}", self.dim("│"), self.paint(&text, |t| t.italic()))]
            }
            Block::HorizontalRule => vec![self.dim(&"─".repeat(RULE_WIDTH))],
            Block::CodeBlock { language, content } => {
                let mut lines = Vec::new();
                if !language.is_empty() {
                    lines.push(self.dim(&format!("[{language}]")));
                }
                lines.extend(
                    content
                        .lines()
                        .map(|l| format!("{CODE_INDENT}{}", self.paint(l, |t| t.green()))),
                );
                lines
            }
            Block::Spacer => vec![String::new()],
        }
    }

    pub fn inline(&self, runs: &[Inline]) -> String {
        runs.iter()
            .map(|run| match run {
                Inline::Plain(t) => t.clone(),
                Inline::Bold(t) => self.bold(t),
                Inline::Code(t) => self.paint(t, |t| t.yellow()),
            })
            .collect()
    }

    /// `[#####.....]  50%` style bar for a fraction in `0.0..=1.0`.
    pub fn progress_bar(&self, fraction: f64, width: usize) -> String {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let filled = (fraction * width as f64).round() as usize;
        let bar = format!(
            "{}{}",
            self.paint(&"█".repeat(filled), |t| t.cyan()),
            self.dim(&"░".repeat(width - filled))
        );
        format!("{bar} {:>3}%", (fraction * 100.0).round() as u32)
    }
}
