//! Error type for localization operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by explicit localization operations.
///
/// Resolution never produces one of these: a missing key degrades to the key
/// itself. Construction never produces one either, discovery and load
/// failures are logged and replaced by defaults.
#[derive(Debug, Error)]
pub enum LocalizationError {
    /// A translation file could not be read.
    #[error("failed to read translations from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A translation file is not a flat JSON object of strings.
    #[error("failed to parse translations from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `set_language` was given a code with no loaded table.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Export was requested for a code with no loaded table.
    #[error("language not found: {0}")]
    LanguageNotFound(String),

    /// An exported table could not be written.
    #[error("failed to write translations to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A translation directory could not be listed.
    #[error("failed to scan translations in {location}: {source}")]
    Discovery {
        location: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The bundled set has no file for the requested path.
    #[error("bundled translation file not found: {0}")]
    MissingBundleEntry(String),
}

pub type Result<T> = std::result::Result<T, LocalizationError>;
