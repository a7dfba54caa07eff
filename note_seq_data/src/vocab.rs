// Vocabulary: the sorted set of distinct tokens plus the token<->index map.
//
// Indices are sorted positions, so a given reference sequence always yields
// the same mapping regardless of token order or repetition. The map is
// derived from the sorted token list at construction and never mutated.

use crate::error::DataError;
use crate::token::{Token, TokenKind};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    /// Distinct tokens in ascending order. Position is the index.
    tokens: Vec<Token>,
    /// Reverse lookup: token -> position in `tokens`.
    index: BTreeMap<Token, usize>,
}

impl Vocabulary {
    /// Build the vocabulary of a reference sequence.
    pub fn build(reference: &[Token]) -> Result<Self, DataError> {
        if reference.is_empty() {
            return Err(DataError::EmptyInput);
        }

        let mut tokens = reference.to_vec();
        tokens.sort();
        tokens.dedup();

        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        log::debug!(
            "built vocabulary of {} tokens from {} reference tokens",
            tokens.len(),
            reference.len()
        );
        Ok(Vocabulary { tokens, index })
    }

    /// Number of distinct tokens (`V`). Never zero.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The sorted token list.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn index_of(&self, token: &Token) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn token_at(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn contains(&self, token: &Token) -> bool {
        self.index.contains_key(token)
    }

    /// Map predicted class indices back to tokens. Any index outside the
    /// vocabulary is an error rather than being skipped.
    pub fn decode(&self, indices: &[usize]) -> Result<Vec<Token>, DataError> {
        indices
            .iter()
            .map(|&i| {
                self.token_at(i).cloned().ok_or(DataError::IndexOutOfRange {
                    index: i,
                    vocab_size: self.len(),
                })
            })
            .collect()
    }

    /// (note count, chord count) over the vocabulary entries.
    pub fn kind_counts(&self) -> (usize, usize) {
        let chords = self
            .tokens
            .iter()
            .filter(|t| t.kind() == TokenKind::Chord)
            .count();
        (self.len() - chords, chords)
    }
}
