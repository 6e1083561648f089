//! Markdown-subset renderer for card text.
//!
//! # Supported syntax
//! ```text
//! # Heading 1 / ## Heading 2 / ### Heading 3
//! - list item  (or "* list item")
//! > quote
//! ---          (also *** and ___)
//! **bold** and `inline code`
//! ```
//!
//! Fenced code blocks (three backticks, optional language tag) are cut out
//! before any line classification happens, so their content is never parsed.
//! Everything is line-at-a-time: there are no nested lists, tables or links.

const FENCE: &str = "```";

/// Inline-styled run of text inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Plain(String),
    Bold(String),
    Code(String),
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(t) | Self::Bold(t) | Self::Code(t) => t,
        }
    }
}

/// Displayable block produced from one line (or one fenced region).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    Heading { level: u8, runs: Vec<Inline> },
    ListItem(Vec<Inline>),
    Blockquote(Vec<Inline>),
    HorizontalRule,
    CodeBlock { language: String, content: String },
    Spacer,
}

impl Block {
    /// Inline runs of the block; empty for rules, spacers and code blocks.
    pub fn runs(&self) -> &[Inline] {
        match self {
            Self::Paragraph(runs)
            | Self::Heading { runs, .. }
            | Self::ListItem(runs)
            | Self::Blockquote(runs) => runs,
            Self::HorizontalRule | Self::CodeBlock { .. } | Self::Spacer => &[],
        }
    }
}

/// Render markdown-subset text into blocks, in input order.
pub fn render(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();

    for segment in split_fences(text) {
        match segment {
            Segment::Fenced(inner) => blocks.push(code_block(inner)),
            Segment::Text(text) => blocks.extend(
                text.split('\n')
                    .map(|line| classify_line(line.strip_suffix('\r').unwrap_or(line))),
            ),
        }
    }

    blocks
}

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Text(&'a str),
    Fenced(&'a str),
}

/// Split text into plain and fenced segments. An opening fence without a
/// closing one swallows the rest of the input.
fn split_fences(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;
    let mut after_fence = false;

    while let Some(open) = rest.find(FENCE) {
        push_text(&mut segments, &rest[..open], after_fence, true);

        let body = &rest[open + FENCE.len()..];
        match body.find(FENCE) {
            Some(close) => {
                segments.push(Segment::Fenced(&body[..close]));
                rest = &body[close + FENCE.len()..];
            }
            None => {
                segments.push(Segment::Fenced(body));
                rest = "";
            }
        }
        after_fence = true;
    }

    push_text(&mut segments, rest, after_fence, false);
    segments
}

// The line break that terminates a fence line (or precedes an opening fence)
// belongs to the fence, not to the surrounding text.
fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str, after_fence: bool, before_fence: bool) {
    let mut text = text;
    if after_fence {
        text = text
            .strip_prefix("\r\n")
            .or_else(|| text.strip_prefix('\n'))
            .unwrap_or(text);
    }
    if before_fence {
        text = text.strip_suffix('\n').unwrap_or(text);
        text = text.strip_suffix('\r').unwrap_or(text);
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
}

fn code_block(inner: &str) -> Block {
    let (tag_line, body) = inner.split_once('\n').unwrap_or((inner, ""));
    let language = tag_line
        .trim_matches(|c: char| c == '`' || c.is_whitespace())
        .to_string();

    Block::CodeBlock {
        language,
        content: trim_blank_lines(body),
    }
}

fn trim_blank_lines(body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let Some(start) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(start);
    lines[start..=end].join("\n")
}

/// Line rule: receives the raw line and its trimmed form.
type LineRule = fn(&str, &str) -> Option<Block>;

/// Evaluated top to bottom; the first rule that matches wins.
const LINE_RULES: [LineRule; 7] = [
    horizontal_rule,
    heading_1,
    heading_2,
    heading_3,
    blockquote,
    list_item,
    blank,
];

fn classify_line(line: &str) -> Block {
    let trimmed = line.trim();
    LINE_RULES
        .iter()
        .find_map(|rule| rule(line, trimmed))
        .unwrap_or_else(|| Block::Paragraph(inline(line)))
}

fn horizontal_rule(_: &str, trimmed: &str) -> Option<Block> {
    matches!(trimmed, "---" | "***" | "___").then_some(Block::HorizontalRule)
}

fn heading(trimmed: &str, marker: &str, level: u8) -> Option<Block> {
    trimmed.strip_prefix(marker).map(|rest| Block::Heading {
        level,
        runs: inline(rest.trim_start()),
    })
}

fn heading_1(_: &str, trimmed: &str) -> Option<Block> {
    heading(trimmed, "# ", 1)
}

fn heading_2(_: &str, trimmed: &str) -> Option<Block> {
    heading(trimmed, "## ", 2)
}

fn heading_3(_: &str, trimmed: &str) -> Option<Block> {
    heading(trimmed, "### ", 3)
}

fn blockquote(_: &str, trimmed: &str) -> Option<Block> {
    trimmed
        .strip_prefix("> ")
        .map(|rest| Block::Blockquote(inline(rest.trim_start())))
}

fn list_item(_: &str, trimmed: &str) -> Option<Block> {
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .map(|rest| Block::ListItem(inline(rest.trim_start())))
}

fn blank(_: &str, trimmed: &str) -> Option<Block> {
    trimmed.is_empty().then_some(Block::Spacer)
}

/// Split a line into bold, inline-code and plain runs.
///
/// Spans are matched leftmost-first and non-greedy. A marker without a
/// partner stays in the plain text as typed.
pub fn inline(text: &str) -> Vec<Inline> {
    let mut runs = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        let span = if rest.starts_with("**") {
            rest[2..].find("**").map(|end| (Inline::Bold(rest[2..2 + end].to_string()), end + 4))
        } else if rest.starts_with('`') {
            rest[1..].find('`').map(|end| (Inline::Code(rest[1..1 + end].to_string()), end + 2))
        } else {
            None
        };

        match span {
            Some((run, len)) => {
                if plain_start < i {
                    runs.push(Inline::Plain(text[plain_start..i].to_string()));
                }
                runs.push(run);
                i += len;
                plain_start = i;
            }
            None => i += rest.chars().next().map_or(1, char::len_utf8),
        }
    }

    if plain_start < text.len() {
        runs.push(Inline::Plain(text[plain_start..].to_string()));
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(s: &str) -> Inline {
        Inline::Plain(s.to_string())
    }

    fn bold(s: &str) -> Inline {
        Inline::Bold(s.to_string())
    }

    fn code(s: &str) -> Inline {
        Inline::Code(s.to_string())
    }

    fn code_block(language: &str, content: &str) -> Block {
        Block::CodeBlock {
            language: language.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render("").is_empty());
    }

    #[test]
    fn fenced_block_with_language() {
        assert_eq!(render("```py\ncode\n```"), vec![code_block("py", "code")]);
    }

    #[test]
    fn fenced_block_ignores_surrounding_text() {
        let blocks = render("# Before\n```py\ncode\n```\n- after");
        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 1, runs: vec![plain("Before")] },
                code_block("py", "code"),
                Block::ListItem(vec![plain("after")]),
            ]
        );
    }

    #[test]
    fn fenced_content_is_not_classified() {
        let blocks = render("```\n# not a heading\n- not a list\n> not a quote\n```");
        assert_eq!(
            blocks,
            vec![code_block("", "# not a heading\n- not a list\n> not a quote")]
        );
    }

    #[test]
    fn fenced_content_trims_blank_lines_but_keeps_indent() {
        let blocks = render("```rust\n\n    let x = 1;\n  \n```");
        assert_eq!(blocks, vec![code_block("rust", "    let x = 1;")]);
    }

    #[test]
    fn unterminated_fence_consumes_rest() {
        let blocks = render("intro\n```js\nconst a = 1;\n# still code");
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![plain("intro")]),
                code_block("js", "const a = 1;\n# still code"),
            ]
        );
    }

    #[test]
    fn single_line_fence_is_language_only() {
        assert_eq!(render("```x```"), vec![code_block("x", "")]);
    }

    #[test]
    fn heading_levels() {
        assert_eq!(
            render("# Title"),
            vec![Block::Heading { level: 1, runs: vec![plain("Title")] }]
        );
        assert_eq!(
            render("## Sub"),
            vec![Block::Heading { level: 2, runs: vec![plain("Sub")] }]
        );
        assert_eq!(
            render("  ### Third"),
            vec![Block::Heading { level: 3, runs: vec![plain("Third")] }]
        );
    }

    #[test]
    fn heading_drops_whitespace_after_marker() {
        assert_eq!(
            render("#  Title"),
            vec![Block::Heading { level: 1, runs: vec![plain("Title")] }]
        );
        assert_eq!(
            render("###   **Deep**"),
            vec![Block::Heading { level: 3, runs: vec![Inline::Bold("Deep".to_string())] }]
        );
    }

    #[test]
    fn heading_without_space_is_paragraph() {
        assert_eq!(render("#tag"), vec![Block::Paragraph(vec![plain("#tag")])]);
    }

    #[test]
    fn horizontal_rules() {
        for rule in ["---", "***", "___", "  ---  "] {
            assert_eq!(render(rule), vec![Block::HorizontalRule], "rule {rule:?}");
        }
    }

    #[test]
    fn rule_takes_precedence_over_list() {
        // "***" would otherwise look like a list item marker.
        assert_eq!(render("***"), vec![Block::HorizontalRule]);
    }

    #[test]
    fn quote_takes_precedence_over_list() {
        assert_eq!(
            render("> - item"),
            vec![Block::Blockquote(vec![plain("- item")])]
        );
    }

    #[test]
    fn list_markers() {
        assert_eq!(
            render("- one\n* two"),
            vec![
                Block::ListItem(vec![plain("one")]),
                Block::ListItem(vec![plain("two")]),
            ]
        );
    }

    #[test]
    fn blank_lines_become_spacers() {
        assert_eq!(
            render("a\n\n   \nb"),
            vec![
                Block::Paragraph(vec![plain("a")]),
                Block::Spacer,
                Block::Spacer,
                Block::Paragraph(vec![plain("b")]),
            ]
        );
    }

    #[test]
    fn paragraph_keeps_line_verbatim() {
        assert_eq!(
            render("  indented text"),
            vec![Block::Paragraph(vec![plain("  indented text")])]
        );
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(
            render("# A\r\nb"),
            vec![
                Block::Heading { level: 1, runs: vec![plain("A")] },
                Block::Paragraph(vec![plain("b")]),
            ]
        );
    }

    #[test]
    fn bold_run() {
        assert_eq!(inline("**x**"), vec![bold("x")]);
    }

    #[test]
    fn code_run() {
        assert_eq!(inline("`y`"), vec![code("y")]);
    }

    #[test]
    fn mixed_runs_in_order() {
        assert_eq!(inline("**a** b `c`"), vec![bold("a"), plain(" b "), code("c")]);
    }

    #[test]
    fn unmatched_markers_stay_literal() {
        assert_eq!(inline("2 * 3 = 6"), vec![plain("2 * 3 = 6")]);
        assert_eq!(inline("a `b"), vec![plain("a `b")]);
        assert_eq!(inline("**open"), vec![plain("**open")]);
    }

    #[test]
    fn code_span_inside_bold_markers_is_bold_text() {
        assert_eq!(inline("**`x`**"), vec![bold("`x`")]);
    }

    #[test]
    fn inline_handles_multibyte_text() {
        assert_eq!(
            inline("héllo **wörld** ✓"),
            vec![plain("héllo "), bold("wörld"), plain(" ✓")]
        );
    }

    #[test]
    fn styled_runs_inside_blocks() {
        assert_eq!(
            render("- **Join**: `\"\".join(words)` merges"),
            vec![Block::ListItem(vec![
                bold("Join"),
                plain(": "),
                code("\"\".join(words)"),
                plain(" merges"),
            ])]
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let text = "### Core\n- **a**\n> q\n---\n```py\nx = 1\n```\ntext `c`";
        assert_eq!(render(text), render(text));
    }
}
