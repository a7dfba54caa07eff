// Raw token sources.
//
// The pipeline never parses MIDI itself. Whatever extracts notes and chords
// from a score hands them over through `TokenSource`, either as a file
// written earlier or directly in memory. Paths are always supplied by the
// caller (config or CLI), never baked in.
//
// File formats:
// - JSON: a single array of strings, e.g. `["E4", "4.7.11", "E4"]`.
// - Text: tokens separated by any whitespace; one token per line works.

use crate::error::DataError;
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Anything that can produce a raw token sequence.
pub trait TokenSource {
    fn load(&self) -> Result<Vec<Token>, DataError>;

    /// Short human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// On-disk token list format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenFormat {
    #[default]
    Json,
    Text,
}

/// A JSON array of token strings.
#[derive(Debug, Clone)]
pub struct JsonTokenFile {
    pub path: PathBuf,
}

impl JsonTokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonTokenFile { path: path.into() }
    }
}

impl TokenSource for JsonTokenFile {
    fn load(&self) -> Result<Vec<Token>, DataError> {
        let data = std::fs::read_to_string(&self.path)?;
        let tokens: Vec<Token> = serde_json::from_str(&data)?;
        log::debug!("loaded {} tokens from {}", tokens.len(), self.path.display());
        Ok(tokens)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// Whitespace-separated tokens in a plain text file.
#[derive(Debug, Clone)]
pub struct TextTokenFile {
    pub path: PathBuf,
}

impl TextTokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TextTokenFile { path: path.into() }
    }
}

impl TokenSource for TextTokenFile {
    fn load(&self) -> Result<Vec<Token>, DataError> {
        let data = std::fs::read_to_string(&self.path)?;
        let tokens: Vec<Token> = data.split_whitespace().map(Token::from).collect();
        log::debug!("loaded {} tokens from {}", tokens.len(), self.path.display());
        Ok(tokens)
    }

    fn describe(&self) -> String {
        format!("text:{}", self.path.display())
    }
}

/// Tokens already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokens(pub Vec<Token>);

impl TokenSource for InMemoryTokens {
    fn load(&self) -> Result<Vec<Token>, DataError> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("memory:{} tokens", self.0.len())
    }
}

/// Open a token file in the given format.
pub fn open_token_file(path: &Path, format: TokenFormat) -> Box<dyn TokenSource> {
    match format {
        TokenFormat::Json => Box::new(JsonTokenFile::new(path)),
        TokenFormat::Text => Box::new(TextTokenFile::new(path)),
    }
}

/// Write tokens as a JSON array, the format `JsonTokenFile` reads.
pub fn save_tokens_json(path: &Path, tokens: &[Token]) -> Result<(), DataError> {
    let json = serde_json::to_string(tokens)?;
    std::fs::write(path, json)?;
    Ok(())
}
