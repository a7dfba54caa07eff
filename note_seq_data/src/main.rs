// Note sequence dataset preparation — CLI entry point.
//
// Loads a token file, builds the vocabulary, windows and encoding, prints a
// summary, and optionally writes everything as JSON for a training script.
//
// Usage:
//   cargo run -p note_seq_data --bin prepare -- [tokens.json]
//     [--config dataset.json] [--reference corpus.json] [--seq-len N]
//     [--encoding scalar|one_hot] [--format json|text]
//     [--validation F] [--out dataset_out.json]
//
// With --config, the config file supplies the defaults and any other flag
// overrides it. Set RUST_LOG=debug for per-stage details.

use note_seq_data::config::DatasetConfig;
use note_seq_data::dataset::{DatasetSplit, DatasetSummary, NoteDataset};
use note_seq_data::encoding::Encoding;
use note_seq_data::error::DataError;
use note_seq_data::source::TokenFormat;
use note_seq_data::token::Token;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything a training script needs, in one JSON document.
#[derive(Serialize)]
struct Export<'a> {
    summary: DatasetSummary,
    vocabulary: &'a [Token],
    data: DatasetSplit,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let output_path: Option<PathBuf> = parse_flag(&args, "--out");

    println!("=== Note Sequence Dataset ===");
    println!("Tokens: {}", config.data_path.display());
    println!("Vocabulary from: {}", config.reference_path().display());
    println!("Sequence length: {}", config.sequence_len);
    println!("Encoding: {}", config.encoding.name());
    println!();

    if let Err(e) = run(&config, output_path.as_deref()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(config: &DatasetConfig, output_path: Option<&Path>) -> Result<(), DataError> {
    println!("[1/2] Building dataset...");
    let dataset = NoteDataset::from_config(config)?;
    let summary = dataset.summary();
    println!(
        "  {} tokens, vocabulary of {} ({} notes, {} chords)",
        summary.num_tokens, summary.vocab_size, summary.note_tokens, summary.chord_tokens
    );
    println!("  {} windows", summary.num_windows);
    println!(
        "  Inputs {:?}, targets {:?}",
        summary.input_shape, summary.target_shape
    );
    if dataset.is_empty() {
        println!("  Sequence is not longer than the window; no training examples.");
    }

    let Some(path) = output_path else {
        println!("[2/2] No --out given, skipping export.");
        return Ok(());
    };

    println!("[2/2] Writing {}...", path.display());
    let data = dataset.split(config.validation_fraction)?;
    println!(
        "  {} train / {} validation examples",
        data.train.num_examples(),
        data.validation.num_examples()
    );
    let export = Export {
        summary,
        vocabulary: dataset.vocabulary().tokens(),
        data,
    };
    let json = serde_json::to_string(&export)?;
    std::fs::write(path, json)?;
    println!("  Done.");
    Ok(())
}

/// Start from --config (or defaults) and apply flag overrides.
fn build_config(args: &[String]) -> Result<DatasetConfig, DataError> {
    let mut config = match parse_flag::<PathBuf>(args, "--config") {
        Some(path) => DatasetConfig::load(&path)?,
        None => DatasetConfig::default(),
    };

    if let Some(path) = args.get(1).filter(|s| !s.starts_with("--")) {
        config.data_path = PathBuf::from(path);
    }
    if let Some(path) = parse_flag::<PathBuf>(args, "--reference") {
        config.reference_path = Some(path);
    }
    if let Some(len) = parse_flag(args, "--seq-len") {
        config.sequence_len = len;
    }
    if let Some(name) = parse_flag::<String>(args, "--encoding") {
        config.encoding = parse_encoding(&name)?;
    }
    if let Some(name) = parse_flag::<String>(args, "--format") {
        config.token_format = parse_format(&name)?;
    }
    if let Some(fraction) = parse_flag(args, "--validation") {
        config.validation_fraction = fraction;
    }

    config.validate()?;
    Ok(config)
}

fn parse_encoding(name: &str) -> Result<Encoding, DataError> {
    match name.to_lowercase().as_str() {
        "scalar" => Ok(Encoding::Scalar),
        "one_hot" | "onehot" | "one-hot" => Ok(Encoding::OneHot),
        _ => Err(DataError::Config(format!("unknown encoding '{name}'"))),
    }
}

fn parse_format(name: &str) -> Result<TokenFormat, DataError> {
    match name.to_lowercase().as_str() {
        "json" => Ok(TokenFormat::Json),
        "text" | "txt" => Ok(TokenFormat::Text),
        _ => Err(DataError::Config(format!("unknown token format '{name}'"))),
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
