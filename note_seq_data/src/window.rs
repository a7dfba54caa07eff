// Sliding-window generation over a token sequence.
//
// A window of length L starting at offset i pairs tokens [i, i+L) with the
// token at i+L. The window steps by one, so a sequence of N tokens yields
// N - L windows when N > L and none otherwise. Windows come out in
// ascending start order; that order is temporal adjacency in the source
// and the ordered train/validation split in dataset.rs depends on it.
//
// Every token of the sequence is translated through the vocabulary before
// any window is built, so an uncovered token is reported even when it would
// not land in any window.

use crate::error::DataError;
use crate::token::Token;
use crate::vocab::Vocabulary;
use serde::{Deserialize, Serialize};

/// One training pair in vocabulary-index form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexWindow {
    /// Indices of the L context tokens, oldest first.
    pub context: Vec<usize>,
    /// Index of the token that follows the context.
    pub target: usize,
}

/// Translate a whole sequence into vocabulary indices.
pub fn index_sequence(sequence: &[Token], vocab: &Vocabulary) -> Result<Vec<usize>, DataError> {
    sequence
        .iter()
        .enumerate()
        .map(|(position, token)| {
            vocab.index_of(token).ok_or_else(|| DataError::UnknownToken {
                token: token.clone(),
                position,
            })
        })
        .collect()
}

/// Slide a step-1 window of `length` over `sequence`.
pub fn generate_windows(
    sequence: &[Token],
    length: usize,
    vocab: &Vocabulary,
) -> Result<Vec<IndexWindow>, DataError> {
    if length == 0 {
        return Err(DataError::InvalidWindowLength);
    }
    let indices = index_sequence(sequence, vocab)?;
    let windows = windows_from_indices(&indices, length);
    log::debug!(
        "generated {} windows of length {} from {} tokens",
        windows.len(),
        length,
        sequence.len()
    );
    Ok(windows)
}

/// Window an already-indexed sequence. `length` must be non-zero.
fn windows_from_indices(indices: &[usize], length: usize) -> Vec<IndexWindow> {
    if indices.len() <= length {
        return Vec::new();
    }
    indices
        .windows(length + 1)
        .map(|w| IndexWindow {
            context: w[..length].to_vec(),
            target: w[length],
        })
        .collect()
}

/// Advance a generation pattern by one step: drop the oldest index and
/// append the newly predicted one. The pattern length is unchanged.
pub fn next_pattern(pattern: &[usize], predicted: usize) -> Vec<usize> {
    let mut next = Vec::with_capacity(pattern.len());
    if !pattern.is_empty() {
        next.extend_from_slice(&pattern[1..]);
        next.push(predicted);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokens;

    fn vocab_of(items: &[&str]) -> Vocabulary {
        Vocabulary::build(&tokens(items)).unwrap()
    }

    #[test]
    fn test_worked_example() {
        let seq = tokens(&["C", "D", "E", "F", "G"]);
        let vocab = vocab_of(&["C", "D", "E", "F", "G"]);
        let windows = generate_windows(&seq, 3, &vocab).unwrap();
        assert_eq!(
            windows,
            vec![
                IndexWindow { context: vec![0, 1, 2], target: 3 },
                IndexWindow { context: vec![1, 2, 3], target: 4 },
            ]
        );
    }

    #[test]
    fn test_window_count() {
        let seq = tokens(&["a", "b", "a", "c", "b", "b", "a"]);
        let vocab = vocab_of(&["a", "b", "c"]);
        for length in 1..10 {
            let windows = generate_windows(&seq, length, &vocab).unwrap();
            assert_eq!(windows.len(), seq.len().saturating_sub(length));
            assert!(windows.iter().all(|w| w.context.len() == length));
        }
    }

    #[test]
    fn test_short_sequence_gives_no_windows() {
        let vocab = vocab_of(&["a", "b"]);
        assert!(generate_windows(&tokens(&["a", "b"]), 2, &vocab).unwrap().is_empty());
        assert!(generate_windows(&tokens(&["a"]), 5, &vocab).unwrap().is_empty());
        assert!(generate_windows(&[], 1, &vocab).unwrap().is_empty());
    }

    #[test]
    fn test_zero_length_rejected() {
        let vocab = vocab_of(&["a"]);
        let err = generate_windows(&tokens(&["a", "a"]), 0, &vocab).unwrap_err();
        assert!(matches!(err, DataError::InvalidWindowLength));
    }

    #[test]
    fn test_unknown_token() {
        let vocab = vocab_of(&["A", "B"]);
        let err = generate_windows(&tokens(&["A", "C"]), 1, &vocab).unwrap_err();
        match err {
            DataError::UnknownToken { token, position } => {
                assert_eq!(token.as_str(), "C");
                assert_eq!(position, 1);
            }
            other => panic!("expected UnknownToken, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_token_detected_without_windows() {
        // N <= L, but the stray token must still be reported.
        let vocab = vocab_of(&["A"]);
        let err = generate_windows(&tokens(&["Z"]), 4, &vocab).unwrap_err();
        assert!(matches!(err, DataError::UnknownToken { position: 0, .. }));
    }

    #[test]
    fn test_order_and_reproducibility() {
        let seq = tokens(&["e", "d", "c", "d", "e", "e", "e", "d", "d"]);
        let vocab = vocab_of(&["c", "d", "e"]);
        let first = generate_windows(&seq, 2, &vocab).unwrap();
        let second = generate_windows(&seq, 2, &vocab).unwrap();
        assert_eq!(first, second);
        // Window i starts at token i: its first context index is token i's.
        let indexed = index_sequence(&seq, &vocab).unwrap();
        for (i, w) in first.iter().enumerate() {
            assert_eq!(w.context[0], indexed[i]);
            assert_eq!(w.target, indexed[i + 2]);
        }
    }

    #[test]
    fn test_next_pattern() {
        assert_eq!(next_pattern(&[1, 2, 3], 7), vec![2, 3, 7]);
        assert_eq!(next_pattern(&[4], 0), vec![0]);
        assert!(next_pattern(&[], 3).is_empty());
    }
}
