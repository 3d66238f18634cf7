//! Internationalization (i18n) module for server messages.
//!
//! Resolves a message key plus optional positional arguments into a string in
//! the server's active language, falling back deterministically when a key or
//! language is missing.
//!
//! # Architecture
//!
//! - `source`: Where translation files come from (directory or bundled set)
//! - `catalog`: Language discovery and locale-based language detection
//! - `builtin`: Minimal translation sets used when a file cannot be loaded
//! - `format`: Positional printf-style template formatting
//! - `service`: The translation store, resolver and persistence
//! - `metrics`: Lookup and fallback counters
//!
//! # Example
//!
//! ```rust,ignore
//! use repo_locale::i18n::{self, LocalizationService};
//! use repo_locale::t;
//!
//! // Explicit instance
//! let service = LocalizationService::from_dir("locale");
//! let msg = service.get("server_started", &[8080.into()]);
//!
//! // Process-wide instance
//! let msg = t!("server_started", 8080);
//! i18n::set_language("ru")?;
//! ```

pub mod builtin;
pub mod catalog;
mod error;
pub mod format;
mod metrics;
mod service;
pub mod source;

pub use error::{LocalizationError, Result};
pub use format::FormatArg;
pub use metrics::{LocalizationMetrics, MetricsReport};
pub use service::LocalizationService;
pub use source::{BundleSource, DirectorySource, SourceKind, TranslationSource};

use crate::config::Config;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::warn;

/// Language used when nothing else is available.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Message key to template.
pub type TranslationTable = HashMap<String, String>;

/// Process-wide instance (initialized lazily)
static GLOBAL: OnceLock<RwLock<Arc<LocalizationService>>> = OnceLock::new();

fn global_slot() -> &'static RwLock<Arc<LocalizationService>> {
    GLOBAL.get_or_init(|| {
        let config = Config::from_env().unwrap_or_else(|e| {
            warn!("Invalid localization config, using defaults: {:#}", e);
            Config::default()
        });
        RwLock::new(Arc::new(LocalizationService::from_config(&config)))
    })
}

/// Get the process-wide localization instance.
///
/// Built on first use from the environment configuration; concurrent first
/// callers all observe the same fully built instance.
pub fn global() -> Arc<LocalizationService> {
    let slot = global_slot().read().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&slot)
}

/// Replace the process-wide instance.
pub fn set_global(service: LocalizationService) {
    let service = Arc::new(service);
    let slot = GLOBAL.get_or_init(|| RwLock::new(Arc::clone(&service)));
    *slot.write().unwrap_or_else(PoisonError::into_inner) = service;
}

/// Resolve `key` with the process-wide instance.
///
/// Prefer using the `t!()` macro for ergonomic access.
pub fn t(key: &str, args: &[FormatArg]) -> String {
    global().get(key, args)
}

/// Switch the language of the process-wide instance.
pub fn set_language(code: &str) -> Result<()> {
    global().set_language(code)
}

/// Active language of the process-wide instance.
pub fn language() -> String {
    global().language()
}

/// Translation macro for the process-wide instance.
///
/// # Examples
///
/// ```rust,ignore
/// let msg = t!("server_stopped");
/// let msg = t!("server_started", 8080);
/// ```
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::t($key, &[])
    };
    ($key:expr, $($arg:expr),+ $(,)?) => {
        $crate::i18n::t($key, &[$($crate::i18n::FormatArg::from($arg)),+])
    };
}
