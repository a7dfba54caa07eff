// Dataset configuration, loaded from JSON.
//
// Every field except `data_path` has a default, so a minimal config is
// `{"data_path": "data/notes.json"}`. The vocabulary is built from
// `reference_path` when given and from `data_path` otherwise.
//
// Example:
//   {
//     "data_path": "data/train.json",
//     "reference_path": "data/corpus.json",
//     "sequence_len": 100,
//     "encoding": "one_hot",
//     "token_format": "json",
//     "validation_fraction": 0.1
//   }

use crate::encoding::Encoding;
use crate::error::DataError;
use crate::source::TokenFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Window length used by the original training scripts.
pub const DEFAULT_SEQUENCE_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Token file the windows are drawn from.
    pub data_path: PathBuf,
    /// Token file the vocabulary is built from. Defaults to `data_path`.
    pub reference_path: Option<PathBuf>,
    /// Context window length L.
    pub sequence_len: usize,
    pub encoding: Encoding,
    pub token_format: TokenFormat,
    /// Trailing share of windows held out for validation, in [0, 1).
    pub validation_fraction: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig {
            data_path: PathBuf::new(),
            reference_path: None,
            sequence_len: DEFAULT_SEQUENCE_LEN,
            encoding: Encoding::default(),
            token_format: TokenFormat::default(),
            validation_fraction: 0.0,
        }
    }
}

impl DatasetConfig {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let config: DatasetConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, DataError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.data_path.as_os_str().is_empty() {
            return Err(DataError::Config("data_path is required".into()));
        }
        if self.sequence_len == 0 {
            return Err(DataError::Config("sequence_len must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(DataError::Config(format!(
                "validation_fraction must be in [0, 1), got {}",
                self.validation_fraction
            )));
        }
        Ok(())
    }

    /// The file the vocabulary is built from.
    pub fn reference_path(&self) -> &Path {
        self.reference_path.as_deref().unwrap_or(&self.data_path)
    }
}
