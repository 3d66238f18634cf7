//! Translation sources: where translation files come from.
//!
//! A source can list the language codes it has files for and hand out the raw
//! bytes of one language's file. Two implementations exist, chosen at runtime:
//! a directory on disk and a set of files compiled into the binary.

use super::error::{LocalizationError, Result};
use regex::Regex;
use rust_embed::RustEmbed;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Directory (and bundle root) name used when none is configured.
pub const DEFAULT_LOCALE_DIR: &str = "locale";

/// Root prefix of the bundled file set.
pub const BUNDLE_ROOT: &str = "locale/";

static FILE_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
static BUNDLE_PATH_REGEX: OnceLock<Regex> = OnceLock::new();

fn file_name_regex() -> &'static Regex {
    FILE_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^translations_([a-z]{2}(?:-[A-Z]{2})?)\.json$").expect("Invalid regex")
    })
}

fn bundle_path_regex() -> &'static Regex {
    BUNDLE_PATH_REGEX.get_or_init(|| {
        Regex::new(r"^locale/translations_([a-z]{2}(?:-[A-Z]{2})?)\.json$").expect("Invalid regex")
    })
}

/// Extract the language code from a translation file name.
///
/// `translations_en-US.json` -> `Some("en-US")`
pub fn language_code_from_file_name(name: &str) -> Option<&str> {
    file_name_regex()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|code| code.as_str())
}

/// Extract the language code from a bundle-relative path.
///
/// `locale/translations_ru.json` -> `Some("ru")`
pub fn language_code_from_bundle_path(path: &str) -> Option<&str> {
    bundle_path_regex()
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|code| code.as_str())
}

/// File name holding the translations for `code`.
pub fn translation_file_name(code: &str) -> String {
    format!("translations_{}.json", code)
}

/// Which kind of source backs a localization instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Directory,
    Bundle,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Directory => f.write_str("directory"),
            SourceKind::Bundle => f.write_str("bundle"),
        }
    }
}

/// A place translation tables can be read from.
pub trait TranslationSource: Send + Sync {
    /// Kind of the source.
    fn kind(&self) -> SourceKind;

    /// Language codes with a translation file, in enumeration order.
    ///
    /// The result may contain duplicates; deduplication is left to the caller.
    fn discover(&self) -> Result<Vec<String>>;

    /// Raw contents of the translation file for `code`.
    fn read(&self, code: &str) -> Result<Vec<u8>>;

    /// Human-readable location of the file for `code`, used in errors and logs.
    fn location(&self, code: &str) -> PathBuf;
}

// ==================== Directory Source ====================

/// Translation files stored flat in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for DirectorySource {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE_DIR)
    }
}

impl TranslationSource for DirectorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Directory
    }

    fn discover(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| LocalizationError::Discovery {
            location: self.dir.clone(),
            source,
        })?;

        let mut codes = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };

            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let name = entry.file_name();
            if let Some(code) = name.to_str().and_then(language_code_from_file_name) {
                codes.push(code.to_string());
            }
        }

        Ok(codes)
    }

    fn read(&self, code: &str) -> Result<Vec<u8>> {
        let path = self.location(code);
        fs::read(&path).map_err(|source| LocalizationError::Read { path, source })
    }

    fn location(&self, code: &str) -> PathBuf {
        self.dir.join(translation_file_name(code))
    }
}

// ==================== Bundle Source ====================

/// Translation files compiled into the binary.
#[derive(RustEmbed)]
#[folder = "locale/"]
#[prefix = "locale/"]
struct BundledLocale;

/// Translation files embedded at build time under [`BUNDLE_ROOT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleSource;

impl BundleSource {
    pub fn new() -> Self {
        Self
    }

    /// Language codes present in the bundle, deduplicated in walk order.
    pub fn languages(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for path in BundledLocale::iter() {
            if let Some(code) = language_code_from_bundle_path(&path) {
                if !codes.iter().any(|known| known == code) {
                    codes.push(code.to_string());
                }
            }
        }
        codes
    }

    /// True when the bundle carries no translation files.
    pub fn is_empty(&self) -> bool {
        self.languages().is_empty()
    }
}

impl TranslationSource for BundleSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Bundle
    }

    fn discover(&self) -> Result<Vec<String>> {
        Ok(BundledLocale::iter()
            .filter_map(|path| language_code_from_bundle_path(&path).map(str::to_string))
            .collect())
    }

    fn read(&self, code: &str) -> Result<Vec<u8>> {
        let path = format!("{}{}", BUNDLE_ROOT, translation_file_name(code));
        BundledLocale::get(&path)
            .map(|file| file.data.into_owned())
            .ok_or(LocalizationError::MissingBundleEntry(path))
    }

    fn location(&self, code: &str) -> PathBuf {
        Path::new(BUNDLE_ROOT).join(translation_file_name(code))
    }
}
