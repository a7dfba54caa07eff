// Error type shared by every stage of dataset construction.
//
// All variants are deterministic input-validation failures. Nothing in the
// pipeline retries, substitutes a default index, or returns a partial
// dataset: the first error aborts construction and is handed to the caller.

use crate::token::Token;

/// Everything that can go wrong while loading tokens or building a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The reference sequence for the vocabulary had no tokens.
    #[error("reference sequence is empty; cannot build a vocabulary")]
    EmptyInput,

    /// A token in the windowed sequence is not covered by the vocabulary.
    #[error("token {token} at position {position} is not in the vocabulary")]
    UnknownToken { token: Token, position: usize },

    /// Encoding was asked for with a vocabulary size of zero.
    #[error("vocabulary is empty; cannot encode")]
    EmptyVocabulary,

    /// An index is outside `[0, vocab_size)`.
    #[error("index {index} is out of range for vocabulary of size {vocab_size}")]
    IndexOutOfRange { index: usize, vocab_size: usize },

    /// Window length must be at least 1.
    #[error("window length must be at least 1")]
    InvalidWindowLength,

    /// Windows handed to an encoder disagree on their context length.
    #[error("window {window} has length {found}, expected {expected}")]
    RaggedWindows {
        window: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
