// Note sequence training data.
//
// Turns a flat list of symbolic music tokens (pitch names like "E4", chord
// normal orders like "4.7.11") into next-token prediction examples for
// sequence models: a sorted vocabulary, step-1 sliding windows of fixed
// length, and one of two numeric encodings of those windows.
//
// Architecture:
// - token.rs:    Token newtype, note/chord classification
// - vocab.rs:    Sorted, deduplicated vocabulary and token<->index map
// - window.rs:   Sliding (context, target) windows in index form
// - encoding.rs: Scalar and one-hot encodings into ndarray tensors, plus
//                decoding back to indices
// - source.rs:   Token sources (JSON / text files, in-memory)
// - config.rs:   JSON dataset configuration
// - dataset.rs:  NoteDataset, running the whole pipeline once at construction
// - error.rs:    DataError
//
// MIDI parsing, model training and rendering predictions back to MIDI live
// outside this crate. Everything here is deterministic: the same tokens and
// settings always produce identical tensors.

pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod source;
pub mod token;
pub mod vocab;
pub mod window;

pub use config::DatasetConfig;
pub use dataset::{DatasetSplit, DatasetSummary, NoteDataset};
pub use encoding::{EncodedTensors, Encoding};
pub use error::DataError;
pub use source::{InMemoryTokens, JsonTokenFile, TextTokenFile, TokenFormat, TokenSource};
pub use token::{Token, TokenKind};
pub use vocab::Vocabulary;
pub use window::{IndexWindow, generate_windows};
