//! Language catalog: which languages exist and which one to start with.

use super::metrics::LocalizationMetrics;
use super::source::TranslationSource;
use super::DEFAULT_LANGUAGE;
use tracing::{debug, warn};

/// Locale environment variables, in priority order.
pub const LOCALE_ENV_VARS: &[&str] = &["LANG", "LC_ALL", "LC_MESSAGES", "LANGUAGE"];

/// Discover the supported languages of a source.
///
/// Codes are deduplicated keeping the first occurrence. A source that cannot
/// be scanned, or that has no translation files, yields only the default
/// language. The result is never empty.
pub fn discover_languages(
    source: &dyn TranslationSource,
    metrics: &LocalizationMetrics,
) -> Vec<String> {
    let found = match source.discover() {
        Ok(found) => found,
        Err(e) => {
            warn!(
                "Could not scan {} translations, using '{}' only: {}",
                source.kind(),
                DEFAULT_LANGUAGE,
                e
            );
            metrics.record_discovery_failure();
            Vec::new()
        }
    };

    let mut languages: Vec<String> = Vec::with_capacity(found.len());
    for code in found {
        if !languages.contains(&code) {
            languages.push(code);
        }
    }

    if languages.is_empty() {
        debug!("No translation files found, using '{}'", DEFAULT_LANGUAGE);
        languages.push(DEFAULT_LANGUAGE.to_string());
    }

    languages
}

/// Language part of a locale value: `ru_RU.UTF-8` -> `ru`.
pub fn locale_language(value: &str) -> String {
    value.split('_').next().unwrap_or(value).to_lowercase()
}

/// Pick the starting language among `supported`.
///
/// Locale variables are checked in [`LOCALE_ENV_VARS`] order; the first
/// supported code that starts with a variable's language part wins. Without a
/// match, `prefer_default` selects the default language when it is
/// supported, otherwise the first supported language is used.
pub fn detect_language<F>(supported: &[String], env: F, prefer_default: bool) -> String
where
    F: Fn(&str) -> Option<String>,
{
    for &var in LOCALE_ENV_VARS {
        let Some(value) = env(var).filter(|v| !v.is_empty()) else {
            continue;
        };

        let candidate = locale_language(&value);
        if let Some(code) = supported.iter().find(|code| code.starts_with(&candidate)) {
            debug!("Detected language '{}' from {}={}", code, var, value);
            return code.clone();
        }
    }

    if prefer_default && supported.iter().any(|code| code == DEFAULT_LANGUAGE) {
        return DEFAULT_LANGUAGE.to_string();
    }

    supported
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Whether this platform falls back to the default language before the first
/// discovered one.
pub fn platform_prefers_default() -> bool {
    cfg!(windows)
}

/// Read a variable from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
