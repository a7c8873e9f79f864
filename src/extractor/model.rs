use regex::Regex;
use std::sync::LazyLock;

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());
static LINE_EDGES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?\n ?").unwrap());

/// Best-effort readable content of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadableArticle {
    pub title: String,
    pub site_name: Option<String>,
    /// Plain text with normalized whitespace.
    pub text: String,
}

impl ReadableArticle {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Collapse runs of spaces, keep paragraph breaks as a single blank line.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.trim().replace("\r\n", "\n");
    let spaced = SPACE_RUN.replace_all(&text, " ");
    let paragraphs = BLANK_LINES.replace_all(&spaced, "\n\n");
    LINE_EDGES.replace_all(&paragraphs, "\n").into_owned()
}
