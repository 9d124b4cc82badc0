//! Input text resolution.

use std::fs;
use std::io::{self, Read};

use scholardraft::ScholarDraftConfig;

use super::CliError;

/// Reads the text to process.
///
/// `--text` wins over `--input`; without either, standard input is read to
/// the end.
///
/// # Errors
///
/// Returns [`CliError::Io`] when the input file or standard input cannot be
/// read.
pub fn read_input(config: &ScholarDraftConfig) -> Result<String, CliError> {
    if let Some(text) = &config.text {
        return Ok(text.clone());
    }
    if let Some(path) = &config.input {
        return fs::read_to_string(path).map_err(|error| CliError::Io {
            message: format!("failed to read input file '{path}': {error}"),
        });
    }
    read_from(&mut io::stdin().lock())
}

/// Reads all of `reader` as UTF-8.
///
/// # Errors
///
/// Returns [`CliError::Io`] when reading fails or the input is not UTF-8.
pub fn read_from<R: Read>(reader: &mut R) -> Result<String, CliError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|error| CliError::Io {
            message: format!("failed to read standard input: {error}"),
        })?;
    Ok(text)
}
