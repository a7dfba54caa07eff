// Numeric encodings of index windows.
//
// Two strategies, chosen once per dataset:
//
// - Scalar: each context index becomes `index / V`, a single feature in
//   [0, 1) per position. Targets stay raw class indices. This treats token
//   identity as an ordinal quantity; that compromise is what the scalar
//   models are trained against and is kept as-is.
// - OneHot: each context index becomes a width-V unit vector, and so does
//   the target. Costs V times the memory of Scalar.
//
// Shapes (n = number of windows, L = window length):
//   Scalar  inputs (n, L)     f32,  targets (n)     usize
//   OneHot  inputs (n, L, V)  f32,  targets (n, V)  f32
//
// The window length is passed in rather than read off the first window, so
// an empty window list still yields (0, L) / (0, L, V) inputs that line up
// with non-empty tensors of the same dataset.
//
// Scalar features are divided in f64 and capped just below 1.0; for V past
// 2^24 neighbouring indices share an f32 value and `decode_scalar` is no
// longer exact.
//
// Every index is checked against V before any tensor is allocated. One-hot
// rows are filled in parallel, each into its own preallocated slot, so the
// output row order is the window order.

use crate::error::DataError;
use crate::window::IndexWindow;
use ndarray::{Array1, Array2, Array3, ArrayView1, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Which numeric representation to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    #[default]
    Scalar,
    OneHot,
}

/// Model-ready tensors, tagged by the encoding that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "encoding", rename_all = "snake_case")]
pub enum EncodedTensors {
    Scalar {
        inputs: Array2<f32>,
        targets: Array1<usize>,
        /// Divisor used for the inputs; needed to decode them.
        vocab_size: usize,
    },
    OneHot {
        inputs: Array3<f32>,
        targets: Array2<f32>,
    },
}

impl Encoding {
    /// Encode index windows of context length `length` for a vocabulary of
    /// `vocab_size` tokens.
    pub fn encode(
        &self,
        windows: &[IndexWindow],
        length: usize,
        vocab_size: usize,
    ) -> Result<EncodedTensors, DataError> {
        if vocab_size == 0 {
            return Err(DataError::EmptyVocabulary);
        }
        if length == 0 {
            return Err(DataError::InvalidWindowLength);
        }
        check_windows(windows, length, vocab_size)?;
        let tensors = match self {
            Encoding::Scalar => encode_scalar(windows, length, vocab_size),
            Encoding::OneHot => encode_one_hot(windows, length, vocab_size),
        };
        Ok(tensors)
    }

    /// Number of f32 input elements `encode` would allocate.
    pub fn input_elements(&self, num_windows: usize, length: usize, vocab_size: usize) -> usize {
        match self {
            Encoding::Scalar => num_windows.saturating_mul(length),
            Encoding::OneHot => num_windows
                .saturating_mul(length)
                .saturating_mul(vocab_size),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Scalar => "scalar",
            Encoding::OneHot => "one_hot",
        }
    }
}

/// Validate every window's length and index range.
fn check_windows(
    windows: &[IndexWindow],
    length: usize,
    vocab_size: usize,
) -> Result<(), DataError> {
    for (i, w) in windows.iter().enumerate() {
        if w.context.len() != length {
            return Err(DataError::RaggedWindows {
                window: i,
                expected: length,
                found: w.context.len(),
            });
        }
        if let Some(&index) = w
            .context
            .iter()
            .chain(std::iter::once(&w.target))
            .find(|&&index| index >= vocab_size)
        {
            return Err(DataError::IndexOutOfRange { index, vocab_size });
        }
    }
    Ok(())
}

/// Largest f32 strictly below 1.0.
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// `index / vocab_size` as an f32 in [0, 1).
fn scalar_feature(index: usize, vocab_size: usize) -> f32 {
    ((index as f64 / vocab_size as f64) as f32).min(BELOW_ONE)
}

fn encode_scalar(windows: &[IndexWindow], length: usize, vocab_size: usize) -> EncodedTensors {
    let mut inputs = Array2::<f32>::zeros((windows.len(), length));
    for (mut row, w) in inputs.outer_iter_mut().zip(windows) {
        for (cell, &index) in row.iter_mut().zip(&w.context) {
            *cell = scalar_feature(index, vocab_size);
        }
    }
    let targets = Array1::from(windows.iter().map(|w| w.target).collect::<Vec<_>>());
    EncodedTensors::Scalar {
        inputs,
        targets,
        vocab_size,
    }
}

fn encode_one_hot(windows: &[IndexWindow], length: usize, vocab_size: usize) -> EncodedTensors {
    let mut inputs = Array3::<f32>::zeros((windows.len(), length, vocab_size));
    inputs
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(windows.par_iter())
        .for_each(|(mut block, w)| {
            for (pos, &index) in w.context.iter().enumerate() {
                block[[pos, index]] = 1.0;
            }
        });

    let mut targets = Array2::<f32>::zeros((windows.len(), vocab_size));
    for (mut row, w) in targets.outer_iter_mut().zip(windows) {
        row[w.target] = 1.0;
    }
    EncodedTensors::OneHot { inputs, targets }
}

/// Recover a class index from a scalar feature.
pub fn decode_scalar(value: f32, vocab_size: usize) -> usize {
    (value * vocab_size as f32).round() as usize
}

/// Position of the largest entry; the first one on ties. `None` when empty.
pub fn argmax(row: ArrayView1<'_, f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in row.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

impl EncodedTensors {
    pub fn encoding(&self) -> Encoding {
        match self {
            EncodedTensors::Scalar { .. } => Encoding::Scalar,
            EncodedTensors::OneHot { .. } => Encoding::OneHot,
        }
    }

    /// Number of training examples (rows).
    pub fn num_examples(&self) -> usize {
        match self {
            EncodedTensors::Scalar { inputs, .. } => inputs.len_of(Axis(0)),
            EncodedTensors::OneHot { inputs, .. } => inputs.len_of(Axis(0)),
        }
    }

    pub fn input_shape(&self) -> Vec<usize> {
        match self {
            EncodedTensors::Scalar { inputs, .. } => inputs.shape().to_vec(),
            EncodedTensors::OneHot { inputs, .. } => inputs.shape().to_vec(),
        }
    }

    pub fn target_shape(&self) -> Vec<usize> {
        match self {
            EncodedTensors::Scalar { targets, .. } => targets.shape().to_vec(),
            EncodedTensors::OneHot { targets, .. } => targets.shape().to_vec(),
        }
    }

    /// Turn the input tensor back into index windows.
    pub fn decode_inputs(&self) -> Vec<Vec<usize>> {
        match self {
            EncodedTensors::Scalar {
                inputs, vocab_size, ..
            } => inputs
                .outer_iter()
                .map(|row| row.iter().map(|&v| decode_scalar(v, *vocab_size)).collect())
                .collect(),
            EncodedTensors::OneHot { inputs, .. } => inputs
                .outer_iter()
                .map(|block| {
                    block
                        .outer_iter()
                        .filter_map(argmax)
                        .collect()
                })
                .collect(),
        }
    }

    /// Turn the target tensor back into class indices.
    pub fn decode_targets(&self) -> Vec<usize> {
        match self {
            EncodedTensors::Scalar { targets, .. } => targets.to_vec(),
            EncodedTensors::OneHot { targets, .. } => {
                targets.outer_iter().filter_map(argmax).collect()
            }
        }
    }
}
