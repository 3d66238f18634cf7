//! The localization service: translation tables plus the active language.
//!
//! All mutable state sits behind one reader/writer lock. Lookups and language
//! queries take the shared side and run concurrently; language switches and
//! merges take the exclusive side.

use super::builtin::{builtin_translations, has_builtin};
use super::catalog::{detect_language, discover_languages, platform_prefers_default, process_env};
use super::error::{LocalizationError, Result};
use super::format::{sprintf, FormatArg};
use super::metrics::{LocalizationMetrics, MetricsReport};
use super::source::{BundleSource, DirectorySource, SourceKind, TranslationSource};
use super::{TranslationTable, DEFAULT_LANGUAGE};
use crate::config::{Config, SourceSelection};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

struct State {
    active: String,
    /// Discovery order, extended by merges that introduce a new code.
    languages: Vec<String>,
    tables: HashMap<String, TranslationTable>,
}

/// Resolves message keys into strings of the active language.
pub struct LocalizationService {
    source: Box<dyn TranslationSource>,
    state: RwLock<State>,
    metrics: LocalizationMetrics,
}

impl LocalizationService {
    /// Build from a source, detecting the language from the process locale.
    pub fn new<S: TranslationSource + 'static>(source: S) -> Self {
        Self::with_environment(Box::new(source), process_env, platform_prefers_default())
    }

    /// Build from a source with an explicit environment lookup.
    ///
    /// Every discovered language gets a table: the one read from the source
    /// when it loads, otherwise the built-in set for that code.
    pub fn with_environment<F>(
        source: Box<dyn TranslationSource>,
        env: F,
        prefer_default: bool,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let metrics = LocalizationMetrics::new();
        let languages = discover_languages(source.as_ref(), &metrics);
        let active = detect_language(&languages, env, prefer_default);

        let mut tables = HashMap::with_capacity(languages.len());
        for code in &languages {
            let table = match load_table(source.as_ref(), code) {
                Ok(table) => {
                    debug!("Loaded {} translations for '{}'", table.len(), code);
                    table
                }
                Err(e) => {
                    if has_builtin(code) {
                        warn!("Using built-in translations for '{}': {}", code, e);
                    } else {
                        warn!("Using built-in English translations for '{}': {}", code, e);
                    }
                    metrics.record_fallback_table();
                    builtin_translations(code)
                }
            };
            tables.insert(code.clone(), table);
        }

        info!(
            "Localization ready: {} language(s) from {} source, active '{}'",
            languages.len(),
            source.kind(),
            active
        );

        Self {
            source,
            state: RwLock::new(State {
                active,
                languages,
                tables,
            }),
            metrics,
        }
    }

    /// Build from translation files in `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(DirectorySource::new(dir))
    }

    /// Build from the translation files compiled into the binary.
    pub fn bundled() -> Self {
        Self::new(BundleSource::new())
    }

    /// Use the bundled set when it has any translations, otherwise `dir`.
    pub fn auto(dir: impl Into<PathBuf>) -> Self {
        if BundleSource::new().is_empty() {
            Self::from_dir(dir)
        } else {
            Self::bundled()
        }
    }

    /// Build according to configuration.
    ///
    /// A configured language that turns out to be unsupported is logged and
    /// the detected language is kept.
    pub fn from_config(config: &Config) -> Self {
        let service = match config.locale_source {
            SourceSelection::Auto => Self::auto(&config.locale_dir),
            SourceSelection::Bundle => Self::bundled(),
            SourceSelection::Directory => Self::from_dir(&config.locale_dir),
        };

        if let Some(language) = &config.locale_language {
            if let Err(e) = service.set_language(language) {
                warn!(
                    "Ignoring LOCALE_LANGUAGE, keeping '{}': {}",
                    service.language(),
                    e
                );
            }
        }

        service
    }

    /// Kind of source backing this instance.
    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// True when translations come from the bundled set.
    pub fn is_embedded(&self) -> bool {
        self.source_kind() == SourceKind::Bundle
    }

    // ==================== Resolution ====================

    /// Resolve `key` in the active language.
    ///
    /// With arguments the template is formatted positionally; without, it is
    /// returned as is. Unknown keys come back unchanged.
    pub fn get(&self, key: &str, args: &[FormatArg]) -> String {
        let state = self.read_state();

        let table = state
            .tables
            .get(&state.active)
            .or_else(|| state.tables.get(DEFAULT_LANGUAGE))
            .or_else(|| {
                state
                    .languages
                    .first()
                    .and_then(|code| state.tables.get(code))
            });

        let template = table.and_then(|table| table.get(key));
        self.metrics.record_lookup(template.is_some());

        match template {
            Some(template) if !args.is_empty() => sprintf(template, args),
            Some(template) => template.clone(),
            None => key.to_string(),
        }
    }

    /// Switch the active language.
    pub fn set_language(&self, code: &str) -> Result<()> {
        let mut state = self.write_state();

        if !state.tables.contains_key(code) {
            return Err(LocalizationError::UnsupportedLanguage(code.to_string()));
        }

        if state.active != code {
            info!("Active language changed from '{}' to '{}'", state.active, code);
            state.active = code.to_string();
        }
        Ok(())
    }

    /// The active language.
    pub fn language(&self) -> String {
        self.read_state().active.clone()
    }

    /// Languages that have a table, in discovery order followed by codes
    /// added through merges.
    pub fn supported_languages(&self) -> Vec<String> {
        self.read_state().languages.clone()
    }

    /// Copy of the table for `code`.
    pub fn translations(&self, code: &str) -> Option<TranslationTable> {
        self.read_state().tables.get(code).cloned()
    }

    /// Current counters.
    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    // ==================== Persistence ====================

    /// Merge the translations in `path` into the table for `code`.
    ///
    /// Keys from the file overwrite existing ones; other existing keys are
    /// kept. A code without a table gets one and joins the supported list.
    pub fn load_translations_from_file(&self, code: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| LocalizationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let loaded = parse_table(&bytes, path)?;
        let count = loaded.len();

        let mut state = self.write_state();
        if !state.languages.iter().any(|known| known == code) {
            state.languages.push(code.to_string());
        }
        state
            .tables
            .entry(code.to_string())
            .or_default()
            .extend(loaded);

        info!(
            "Merged {} translations for '{}' from {}",
            count,
            code,
            path.display()
        );
        Ok(())
    }

    /// Write the table for `code` to `path` as a JSON object.
    ///
    /// Parent directories are created as needed. Keys are written sorted.
    pub fn save_translations_to_file(&self, code: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let table = self
            .translations(code)
            .ok_or_else(|| LocalizationError::LanguageNotFound(code.to_string()))?;

        let write_error = |source: std::io::Error| LocalizationError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let sorted: BTreeMap<&String, &String> = table.iter().collect();
        let json = serde_json::to_string_pretty(&sorted)
            .map_err(|e| write_error(std::io::Error::from(e)))?;
        fs::write(path, json).map_err(write_error)?;

        info!(
            "Saved {} translations for '{}' to {}",
            table.len(),
            code,
            path.display()
        );
        Ok(())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_table(source: &dyn TranslationSource, code: &str) -> Result<TranslationTable> {
    let bytes = source.read(code)?;
    parse_table(&bytes, &source.location(code))
}

fn parse_table(bytes: &[u8], path: &Path) -> Result<TranslationTable> {
    serde_json::from_slice(bytes).map_err(|source| LocalizationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn service_in(dir: &Path) -> LocalizationService {
        LocalizationService::with_environment(Box::new(DirectorySource::new(dir)), no_env, false)
    }

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_missing_directory_uses_builtin_english() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        assert_eq!(service.supported_languages(), vec!["en".to_string()]);
        assert_eq!(service.language(), "en");
        assert_eq!(service.translations("en"), Some(builtin_translations("en")));

        let metrics = service.metrics();
        assert_eq!(metrics.discovery_failures, 1);
        assert_eq!(metrics.fallback_tables, 1);
    }

    #[test]
    fn test_loaded_file_replaces_builtin_set() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "translations_en.json", r#"{"greeting": "Hello"}"#);

        let service = service_in(dir.path());
        let table = service.translations("en").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table["greeting"], "Hello");
    }

    #[test]
    fn test_malformed_file_falls_back_to_builtin_for_that_code() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "translations_ru.json", "{not json");
        write_file(dir.path(), "translations_de.json", r#"{"x": "y"}"#);

        let service = service_in(dir.path());
        assert_eq!(service.translations("ru"), Some(builtin_translations("ru")));
        assert_eq!(service.translations("de").unwrap()["x"], "y");
        assert_eq!(service.metrics().fallback_tables, 1);
    }

    #[test]
    fn test_non_string_values_fall_back() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "translations_fr.json", r#"{"count": 3}"#);

        let service = service_in(dir.path());
        assert_eq!(service.translations("fr"), Some(builtin_translations("fr")));
    }

    #[test]
    fn test_malformed_file_for_unknown_code_gets_english_builtin() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "translations_es.json", "[1, 2");

        let service = service_in(dir.path());
        assert_eq!(service.supported_languages(), vec!["es".to_string()]);
        assert_eq!(service.translations("es"), Some(builtin_translations("en")));
        assert_eq!(service.metrics().fallback_tables, 1);
    }

    #[test]
    fn test_detects_language_from_env() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "translations_en.json", "{}");
        write_file(dir.path(), "translations_ru.json", "{}");

        let env = |name: &str| (name == "LANG").then(|| "ru_RU.UTF-8".to_string());
        let service =
            LocalizationService::with_environment(Box::new(DirectorySource::new(dir.path())), env, false);
        assert_eq!(service.language(), "ru");
    }

    #[test]
    fn test_directory_source_is_not_embedded() {
        let dir = TempDir::new().unwrap();
        let service = service_in(dir.path());
        assert_eq!(service.source_kind(), SourceKind::Directory);
        assert!(!service.is_embedded());
    }

    // ==================== Resolution Tests ====================

    #[test]
    fn test_get_formats_with_args() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let message = service.get("server_started", &[FormatArg::from(8080)]);
        assert_eq!(message, "Server started on port 8080");
    }

    #[test]
    fn test_get_without_args_returns_template_verbatim() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        assert_eq!(service.get("server_started", &[]), "Server started on port %d");
    }

    #[test]
    fn test_get_unknown_key_echoes_key() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        assert_eq!(service.get("totally_unknown_key", &[]), "totally_unknown_key");
        assert_eq!(
            service.get("totally_unknown_key", &[FormatArg::from(1)]),
            "totally_unknown_key"
        );

        let metrics = service.metrics();
        assert_eq!(metrics.lookups, 2);
        assert_eq!(metrics.missing_keys, 2);
    }

    #[test]
    fn test_get_argument_mismatch_is_inline() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let message = service.get("server_started", &[FormatArg::from("abc")]);
        assert_eq!(message, "Server started on port %!d(string=abc)");
    }

    #[test]
    fn test_get_does_not_fall_through_to_other_languages_for_missing_keys() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "translations_en.json", r#"{"only_en": "English"}"#);
        write_file(dir.path(), "translations_de.json", r#"{"other": "Deutsch"}"#);

        let service = service_in(dir.path());
        service.set_language("de").unwrap();
        assert_eq!(service.get("only_en", &[]), "only_en");
    }

    #[test]
    fn test_get_falls_back_to_default_table_when_active_has_none() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "translations_en.json", r#"{"k": "english"}"#);
        write_file(dir.path(), "translations_fr.json", r#"{"k": "french"}"#);

        let service = service_in(dir.path());
        service.write_state().active = "xx".to_string();
        assert_eq!(service.get("k", &[]), "english");
    }

    #[test]
    fn test_get_falls_back_to_first_language_without_default() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "translations_fr.json", r#"{"k": "french"}"#);

        let service = service_in(dir.path());
        service.write_state().active = "xx".to_string();
        assert_eq!(service.get("k", &[]), "french");
    }

    // ==================== Language Switching Tests ====================

    #[test]
    fn test_set_language_supported() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "translations_en.json", "{}");
        write_file(dir.path(), "translations_de.json", "{}");

        let service = service_in(dir.path());
        service.set_language("de").unwrap();
        assert_eq!(service.language(), "de");
    }

    #[test]
    fn test_set_language_unsupported_keeps_active() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let err = service.set_language("xx").unwrap_err();
        assert!(matches!(err, LocalizationError::UnsupportedLanguage(ref code) if code == "xx"));
        assert_eq!(service.language(), "en");
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_overwrites_and_preserves_keys() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let extra = dir.path().join("extra.json");
        fs::write(&extra, r#"{"server_stopped": "Shut down", "new_key": "New"}"#).unwrap();
        service.load_translations_from_file("en", &extra).unwrap();

        assert_eq!(service.get("server_stopped", &[]), "Shut down");
        assert_eq!(service.get("new_key", &[]), "New");
        assert_eq!(service.get("package_uploaded", &[]), "Package uploaded");
    }

    #[test]
    fn test_merge_new_code_joins_supported_languages() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let extra = dir.path().join("es.json");
        fs::write(&extra, r#"{"server_stopped": "Servidor detenido"}"#).unwrap();
        service.load_translations_from_file("es", &extra).unwrap();

        assert_eq!(
            service.supported_languages(),
            vec!["en".to_string(), "es".to_string()]
        );
        service.set_language("es").unwrap();
        assert_eq!(service.get("server_stopped", &[]), "Servidor detenido");
    }

    #[test]
    fn test_merge_read_error() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let err = service
            .load_translations_from_file("en", dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, LocalizationError::Read { .. }));
    }

    #[test]
    fn test_merge_parse_error_leaves_table_untouched() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"["not", "an", "object"]"#).unwrap();
        let err = service.load_translations_from_file("en", &bad).unwrap_err();

        assert!(matches!(err, LocalizationError::Parse { .. }));
        assert_eq!(service.translations("en"), Some(builtin_translations("en")));
        assert_eq!(service.supported_languages(), vec!["en".to_string()]);
    }

    // ==================== Export Tests ====================

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let target = dir.path().join("nested/deeper/translations_en.json");
        service.save_translations_to_file("en", &target).unwrap();

        let written: TranslationTable =
            serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(written, builtin_translations("en"));
    }

    #[test]
    fn test_save_unknown_language() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let err = service
            .save_translations_to_file("xx", dir.path().join("out.json"))
            .unwrap_err();
        assert!(matches!(err, LocalizationError::LanguageNotFound(_)));
        assert!(!dir.path().join("out.json").exists());
    }

    #[test]
    fn test_save_write_error() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        // A directory cannot be overwritten with a file
        let err = service.save_translations_to_file("en", dir.path()).unwrap_err();
        assert!(matches!(err, LocalizationError::Write { .. }));
    }

    #[test]
    fn test_save_output_is_sorted() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir.path().join("absent"));

        let target = dir.path().join("out.json");
        service.save_translations_to_file("en", &target).unwrap();
        let content = fs::read_to_string(&target).unwrap();

        let internal = content.find("\"internal_error\"").unwrap();
        let stopped = content.find("\"server_stopped\"").unwrap();
        assert!(internal < stopped);
    }
}
