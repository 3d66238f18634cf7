use crate::i18n::source::DEFAULT_LOCALE_DIR;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Where translations are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceSelection {
    /// Bundled set when it has translations, otherwise the locale directory
    #[default]
    Auto,
    Bundle,
    Directory,
}

impl FromStr for SourceSelection {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "bundle" | "embedded" => Ok(Self::Bundle),
            "directory" | "dir" | "files" => Ok(Self::Directory),
            other => bail!(
                "Invalid LOCALE_SOURCE '{}'. Expected auto, bundle or directory",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Localization
    pub locale_dir: PathBuf,
    pub locale_source: SourceSelection,
    pub locale_language: Option<String>,

    // Server
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale_dir: PathBuf::from(DEFAULT_LOCALE_DIR),
            locale_source: SourceSelection::Auto,
            locale_language: None,
            port: 8080,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Localization
            locale_dir: std::env::var("LOCALE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOCALE_DIR)),
            locale_source: match std::env::var("LOCALE_SOURCE") {
                Ok(value) => value.parse()?,
                Err(_) => SourceSelection::Auto,
            },
            locale_language: std::env::var("LOCALE_LANGUAGE")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            // Server
            port: match std::env::var("SERVER_PORT") {
                Ok(value) => value
                    .trim()
                    .parse()
                    .with_context(|| format!("SERVER_PORT is not a valid port: '{}'", value))?,
                Err(_) => 8080,
            },
        })
    }
}
