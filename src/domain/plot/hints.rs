//! Trailing hint extraction for guidance replies.
//!
//! The guidance agent is instructed to close every reply with a handful of
//! topical words. Those words are lifted off the reply and offered to the
//! student as quick answers; what remains is the text shown in the chat.

use serde::{Deserialize, Serialize};

/// Number of trailing words the guidance agent closes each reply with.
pub const DEFAULT_HINT_COUNT: usize = 6;

/// Characters that separate list items in addition to whitespace.
pub const DEFAULT_SEPARATORS: &[char] = &[',', '，', '、'];

/// Punctuation removed from every token.
pub const DEFAULT_STRIPPED: &[char] = &[
    ',', '，', '、', '。', '.', '!', '?', '！', '？', ';', '；', ':', '：',
];

/// A reply split into display body and trailing hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintedReply {
    /// Trailing hint tokens, in reply order.
    pub hints: Vec<String>,
    /// Leading tokens joined by single spaces. Empty when the whole reply
    /// was consumed as hints.
    pub body: String,
}

impl HintedReply {
    /// Text to show for this reply.
    ///
    /// Falls back to the original reply when nothing remained after the
    /// trailer was removed.
    pub fn display_text<'a>(&'a self, original: &'a str) -> &'a str {
        if self.body.is_empty() {
            original
        } else {
            &self.body
        }
    }
}

/// Splits replies into words and lifts off the trailing hint set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintExtractor {
    trailer_size: usize,
    separators: Vec<char>,
    stripped: Vec<char>,
}

impl Default for HintExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_HINT_COUNT)
    }
}

impl HintExtractor {
    /// Creates an extractor taking `trailer_size` trailing words.
    pub fn new(trailer_size: usize) -> Self {
        Self {
            trailer_size,
            separators: DEFAULT_SEPARATORS.to_vec(),
            stripped: DEFAULT_STRIPPED.to_vec(),
        }
    }

    /// Replaces the list separators.
    pub fn with_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separators = separators.into_iter().collect();
        self
    }

    /// Replaces the stripped punctuation set.
    pub fn with_stripped(mut self, stripped: impl IntoIterator<Item = char>) -> Self {
        self.stripped = stripped.into_iter().collect();
        self
    }

    /// Number of trailing words taken as hints.
    pub fn trailer_size(&self) -> usize {
        self.trailer_size
    }

    /// Splits text into cleaned, non-empty tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| c.is_whitespace() || self.separators.contains(&c))
            .map(|word| self.clean(word))
            .filter(|word| !word.is_empty())
            .collect()
    }

    /// Removes stripped punctuation from a single token.
    pub fn clean(&self, word: &str) -> String {
        word.chars()
            .filter(|c| !self.stripped.contains(c))
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Splits a reply into body and trailing hints.
    pub fn split(&self, reply: &str) -> HintedReply {
        let mut words = self.tokenize(reply);

        if words.len() <= self.trailer_size {
            return HintedReply {
                hints: words,
                body: String::new(),
            };
        }

        let hints = words.split_off(words.len() - self.trailer_size);
        HintedReply {
            hints,
            body: words.join(" "),
        }
    }
}
