use regex::Regex;
use std::sync::LazyLock;

// A run of non-terminators closed by one or more of `.`, `!`, `?`, or the
// unterminated tail of the text. Together the matches cover every byte.
static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]*[.!?]+|[^.!?]+$").unwrap());

/// One sentence-sized piece of narration. Keeps its terminator and the
/// whitespace that preceded it, so units concatenate back to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechUnit {
    index: usize,
    text: String,
}

impl SpeechUnit {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw span, including surrounding whitespace.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// What actually gets spoken. Empty for whitespace-only units.
    pub fn speakable(&self) -> &str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.speakable().is_empty()
    }
}

/// Split `text` into sentence units. Empty input gives no units.
pub fn segment(text: &str) -> Vec<SpeechUnit> {
    SENTENCE
        .find_iter(text)
        .enumerate()
        .map(|(index, span)| SpeechUnit {
            index,
            text: span.as_str().to_string(),
        })
        .collect()
}
