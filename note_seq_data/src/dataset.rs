// NoteDataset: the full pipeline from raw tokens to model-ready tensors.
//
// Construction runs every stage once, in order:
//   reference tokens -> Vocabulary
//   primary tokens + Vocabulary -> index windows
//   index windows -> EncodedTensors (Scalar or OneHot)
// and keeps the results for the lifetime of the dataset. Nothing is mutated
// afterwards. Any stage error aborts construction; there is no partial
// dataset.
//
// The encoding is a required constructor argument. The reference sequence is
// optional and defaults to the primary one; in every known training setup
// the two are the same file, but a vocabulary fixed from a larger corpus is
// supported.

use crate::config::DatasetConfig;
use crate::encoding::{EncodedTensors, Encoding};
use crate::error::DataError;
use crate::source::{TokenSource, open_token_file};
use crate::token::Token;
use crate::vocab::Vocabulary;
use crate::window::{IndexWindow, generate_windows};
use serde::Serialize;

/// Above this many input bytes the one-hot allocation is logged as a warning.
const LARGE_TENSOR_BYTES: usize = 1 << 30;

#[derive(Debug, Clone)]
pub struct NoteDataset {
    vocabulary: Vocabulary,
    sequence_len: usize,
    num_tokens: usize,
    windows: Vec<IndexWindow>,
    tensors: EncodedTensors,
}

/// Encoded training and validation parts of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSplit {
    pub train: EncodedTensors,
    pub validation: EncodedTensors,
}

/// Headline numbers about a built dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub num_tokens: usize,
    pub vocab_size: usize,
    pub note_tokens: usize,
    pub chord_tokens: usize,
    pub sequence_len: usize,
    pub num_windows: usize,
    pub encoding: Encoding,
    pub input_shape: Vec<usize>,
    pub target_shape: Vec<usize>,
}

impl NoteDataset {
    /// Build a dataset from in-memory tokens. `reference` feeds the
    /// vocabulary; `None` means "use `sequence`".
    pub fn new(
        sequence: &[Token],
        reference: Option<&[Token]>,
        sequence_len: usize,
        encoding: Encoding,
    ) -> Result<Self, DataError> {
        let vocabulary = Vocabulary::build(reference.unwrap_or(sequence))?;
        let windows = generate_windows(sequence, sequence_len, &vocabulary)?;

        let elements = encoding.input_elements(windows.len(), sequence_len, vocabulary.len());
        let bytes = elements.saturating_mul(std::mem::size_of::<f32>());
        if bytes > LARGE_TENSOR_BYTES {
            log::warn!(
                "{} encoding of {} windows needs ~{} MiB for inputs",
                encoding.name(),
                windows.len(),
                bytes >> 20
            );
        }

        let tensors = encoding.encode(&windows, sequence_len, vocabulary.len())?;
        let dataset = NoteDataset {
            vocabulary,
            sequence_len,
            num_tokens: sequence.len(),
            windows,
            tensors,
        };
        let summary = dataset.summary();
        log::info!(
            "dataset ready: {} tokens, vocab {}, {} windows of {}, {} inputs {:?}",
            summary.num_tokens,
            summary.vocab_size,
            summary.num_windows,
            summary.sequence_len,
            encoding.name(),
            summary.input_shape
        );
        Ok(dataset)
    }

    /// Load tokens from sources, then build. The reference source defaults to
    /// the primary one.
    pub fn from_sources(
        primary: &dyn TokenSource,
        reference: Option<&dyn TokenSource>,
        sequence_len: usize,
        encoding: Encoding,
    ) -> Result<Self, DataError> {
        let sequence = primary.load()?;
        log::info!("loaded {} tokens from {}", sequence.len(), primary.describe());
        let reference_tokens = match reference {
            Some(source) => {
                let tokens = source.load()?;
                log::info!(
                    "loaded {} reference tokens from {}",
                    tokens.len(),
                    source.describe()
                );
                Some(tokens)
            }
            None => None,
        };
        Self::new(&sequence, reference_tokens.as_deref(), sequence_len, encoding)
    }

    pub fn from_config(config: &DatasetConfig) -> Result<Self, DataError> {
        config.validate()?;
        let primary = open_token_file(&config.data_path, config.token_format);
        let reference = config
            .reference_path
            .as_deref()
            .map(|path| open_token_file(path, config.token_format));
        Self::from_sources(
            primary.as_ref(),
            reference.as_deref(),
            config.sequence_len,
            config.encoding,
        )
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn windows(&self) -> &[IndexWindow] {
        &self.windows
    }

    pub fn tensors(&self) -> &EncodedTensors {
        &self.tensors
    }

    pub fn encoding(&self) -> Encoding {
        self.tensors.encoding()
    }

    pub fn sequence_len(&self) -> usize {
        self.sequence_len
    }

    /// Number of training examples.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Context indices of window `start`, the initial pattern for a
    /// generation loop.
    pub fn seed_window(&self, start: usize) -> Option<&[usize]> {
        self.windows.get(start).map(|w| w.context.as_slice())
    }

    /// Split windows into a leading training part and a trailing validation
    /// part holding `floor(len * validation_fraction)` windows. No shuffling.
    pub fn split_windows(
        &self,
        validation_fraction: f64,
    ) -> Result<(&[IndexWindow], &[IndexWindow]), DataError> {
        if !(0.0..1.0).contains(&validation_fraction) {
            return Err(DataError::Config(format!(
                "validation_fraction must be in [0, 1), got {validation_fraction}"
            )));
        }
        let validation = (self.windows.len() as f64 * validation_fraction).floor() as usize;
        Ok(self.windows.split_at(self.windows.len() - validation))
    }

    /// Encode the ordered train/validation parts with this dataset's encoding.
    pub fn split(&self, validation_fraction: f64) -> Result<DatasetSplit, DataError> {
        let (train, validation) = self.split_windows(validation_fraction)?;
        let encoding = self.encoding();
        let vocab_size = self.vocabulary.len();
        log::debug!(
            "split {} windows into {} train / {} validation",
            self.windows.len(),
            train.len(),
            validation.len()
        );
        Ok(DatasetSplit {
            train: encoding.encode(train, self.sequence_len, vocab_size)?,
            validation: encoding.encode(validation, self.sequence_len, vocab_size)?,
        })
    }

    pub fn summary(&self) -> DatasetSummary {
        let (note_tokens, chord_tokens) = self.vocabulary.kind_counts();
        DatasetSummary {
            num_tokens: self.num_tokens,
            vocab_size: self.vocabulary.len(),
            note_tokens,
            chord_tokens,
            sequence_len: self.sequence_len,
            num_windows: self.windows.len(),
            encoding: self.encoding(),
            input_shape: self.tensors.input_shape(),
            target_shape: self.tensors.target_shape(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryTokens;
    use crate::token::tokens;

    fn melody() -> Vec<Token> {
        tokens(&["E4", "D4", "C4", "D4", "E4", "E4", "E4", "0.4.7", "D4", "D4", "E4"])
    }

    #[test]
    fn test_scalar_dataset() {
        let seq = melody();
        let ds = NoteDataset::new(&seq, None, 4, Encoding::Scalar).unwrap();
        assert_eq!(ds.len(), seq.len() - 4);
        assert_eq!(ds.vocabulary().len(), 4);
        assert_eq!(ds.encoding(), Encoding::Scalar);
        assert_eq!(ds.tensors().input_shape(), vec![7, 4]);
        assert_eq!(ds.tensors().target_shape(), vec![7]);
    }

    #[test]
    fn test_one_hot_dataset() {
        let seq = melody();
        let ds = NoteDataset::new(&seq, None, 3, Encoding::OneHot).unwrap();
        assert_eq!(ds.tensors().input_shape(), vec![8, 3, 4]);
        assert_eq!(ds.tensors().target_shape(), vec![8, 4]);
    }

    #[test]
    fn test_reference_vocabulary_can_be_larger() {
        let seq = tokens(&["A", "B", "A"]);
        let reference = tokens(&["A", "B", "C", "D"]);
        let ds = NoteDataset::new(&seq, Some(&reference), 1, Encoding::OneHot).unwrap();
        assert_eq!(ds.vocabulary().len(), 4);
        assert_eq!(ds.tensors().input_shape(), vec![2, 1, 4]);
    }

    #[test]
    fn test_reference_missing_token_aborts() {
        let err = NoteDataset::new(
            &tokens(&["A", "C"]),
            Some(&tokens(&["A", "B"])),
            1,
            Encoding::Scalar,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::UnknownToken { .. }));
    }

    #[test]
    fn test_empty_sequence_aborts() {
        let err = NoteDataset::new(&[], None, 3, Encoding::Scalar).unwrap_err();
        assert!(matches!(err, DataError::EmptyInput));
    }

    #[test]
    fn test_short_sequence_is_empty_dataset() {
        let ds = NoteDataset::new(&tokens(&["A", "B"]), None, 5, Encoding::OneHot).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.tensors().num_examples(), 0);
        assert_eq!(ds.tensors().input_shape(), vec![0, 5, 2]);
        assert_eq!(ds.tensors().target_shape(), vec![0, 2]);
        assert_eq!(ds.seed_window(0), None);

        let ds = NoteDataset::new(&tokens(&["A", "B"]), None, 5, Encoding::Scalar).unwrap();
        assert_eq!(ds.tensors().input_shape(), vec![0, 5]);
        assert_eq!(ds.tensors().target_shape(), vec![0]);
    }

    #[test]
    fn test_seed_window() {
        let seq = tokens(&["C", "D", "E", "F", "G"]);
        let ds = NoteDataset::new(&seq, None, 3, Encoding::Scalar).unwrap();
        assert_eq!(ds.seed_window(1), Some(&[1usize, 2, 3][..]));
        assert_eq!(ds.seed_window(2), None);
    }

    #[test]
    fn test_split_keeps_order() {
        let seq = melody();
        let ds = NoteDataset::new(&seq, None, 2, Encoding::Scalar).unwrap();
        assert_eq!(ds.len(), 9);

        let (train, validation) = ds.split_windows(0.25).unwrap();
        assert_eq!(validation.len(), 2);
        assert_eq!(train, &ds.windows()[..7]);
        assert_eq!(validation, &ds.windows()[7..]);

        let split = ds.split(0.25).unwrap();
        assert_eq!(split.train.num_examples(), 7);
        assert_eq!(split.validation.num_examples(), 2);
        let expected: Vec<usize> = validation.iter().map(|w| w.target).collect();
        assert_eq!(split.validation.decode_targets(), expected);
    }

    #[test]
    fn test_split_zero_fraction() {
        let ds = NoteDataset::new(&melody(), None, 2, Encoding::OneHot).unwrap();
        let split = ds.split(0.0).unwrap();
        assert_eq!(split.train, *ds.tensors());
        assert_eq!(split.validation.num_examples(), 0);
        assert!(ds.split(1.0).is_err());
    }

    #[test]
    fn test_split_parts_share_trailing_shape() {
        let seq = tokens(&["C", "D", "E", "F", "G"]);
        for encoding in [Encoding::Scalar, Encoding::OneHot] {
            let ds = NoteDataset::new(&seq, None, 3, encoding).unwrap();
            let split = ds.split(0.0).unwrap();
            let train = split.train.input_shape();
            let validation = split.validation.input_shape();
            assert_eq!(train[0], 2);
            assert_eq!(validation[0], 0);
            assert_eq!(train[1..], validation[1..]);
            assert_eq!(validation[1], 3);
            assert_eq!(
                split.train.target_shape()[1..],
                split.validation.target_shape()[1..]
            );
        }
    }

    #[test]
    fn test_from_sources_default_reference() {
        let primary = InMemoryTokens(melody());
        let ds = NoteDataset::from_sources(&primary, None, 3, Encoding::Scalar).unwrap();
        let direct = NoteDataset::new(&melody(), None, 3, Encoding::Scalar).unwrap();
        assert_eq!(ds.windows(), direct.windows());
        assert_eq!(ds.tensors(), direct.tensors());
    }

    #[test]
    fn test_summary() {
        let ds = NoteDataset::new(&melody(), None, 3, Encoding::Scalar).unwrap();
        let summary = ds.summary();
        assert_eq!(summary.num_tokens, 11);
        assert_eq!(summary.vocab_size, 4);
        assert_eq!(summary.note_tokens, 3);
        assert_eq!(summary.chord_tokens, 1);
        assert_eq!(summary.num_windows, 8);
        assert_eq!(summary.input_shape, vec![8, 3]);
    }
}
