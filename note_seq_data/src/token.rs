// Note tokens: the categorical units of a symbolic music sequence.
//
// A token is either a single pitch name with octave (`"E4"`, `"B-3"`) or a
// chord written as its normal-order pitch classes joined by dots (`"4.7.11"`).
// A lone pitch class (`"7"`) is a one-note chord in that spelling. The
// pipeline itself only compares tokens for equality and order; the kind
// helpers exist for summaries and for consumers turning predictions back
// into notes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One categorical music event. Ordered lexicographically by its text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

/// Which spelling a token uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Note,
    Chord,
}

impl Token {
    pub fn new(text: impl Into<String>) -> Self {
        Token(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Chords contain a dot or are made only of digits; everything else is a
    /// named pitch.
    pub fn kind(&self) -> TokenKind {
        let s = self.as_str();
        let all_digits = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if s.contains('.') || all_digits {
            TokenKind::Chord
        } else {
            TokenKind::Note
        }
    }

    /// Pitch classes of a chord token, in written order. `None` for note
    /// tokens or malformed chord text.
    pub fn chord_pitch_classes(&self) -> Option<Vec<u8>> {
        if self.kind() != TokenKind::Chord {
            return None;
        }
        self.0
            .split('.')
            .map(|part| part.parse::<u8>().ok().filter(|&pc| pc < 12))
            .collect()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.to_string())
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Token(s)
    }
}

/// Build a token vector from string literals.
pub fn tokens<S: AsRef<str>>(items: &[S]) -> Vec<Token> {
    items.iter().map(|s| Token::from(s.as_ref())).collect()
}
