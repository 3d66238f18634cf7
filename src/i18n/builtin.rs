//! Built-in minimal translation sets.
//!
//! Used for a language whenever its translation file is missing or cannot be
//! parsed, so that the core server messages are always available.

use super::TranslationTable;

/// Keys every built-in set covers.
pub const BUILTIN_KEYS: &[&str] = &[
    "server_started",
    "server_stopped",
    "package_uploaded",
    "package_not_found",
    "invalid_request",
    "internal_error",
];

// ==================== English ====================

const ENGLISH: &[(&str, &str)] = &[
    ("server_started", "Server started on port %d"),
    ("server_stopped", "Server stopped"),
    ("package_uploaded", "Package uploaded"),
    ("package_not_found", "Package not found"),
    ("invalid_request", "Invalid request"),
    ("internal_error", "Internal server error"),
];

// ==================== Russian ====================

const RUSSIAN: &[(&str, &str)] = &[
    ("server_started", "Сервер запущен на порту %d"),
    ("server_stopped", "Сервер остановлен"),
    ("package_uploaded", "Пакет загружен"),
    ("package_not_found", "Пакет не найден"),
    ("invalid_request", "Неверный запрос"),
    ("internal_error", "Внутренняя ошибка сервера"),
];

// ==================== German ====================

const GERMAN: &[(&str, &str)] = &[
    ("server_started", "Server auf Port %d gestartet"),
    ("server_stopped", "Server gestoppt"),
    ("package_uploaded", "Paket hochgeladen"),
    ("package_not_found", "Paket nicht gefunden"),
    ("invalid_request", "Ungültige Anfrage"),
    ("internal_error", "Interner Serverfehler"),
];

// ==================== French ====================

const FRENCH: &[(&str, &str)] = &[
    ("server_started", "Serveur démarré sur le port %d"),
    ("server_stopped", "Serveur arrêté"),
    ("package_uploaded", "Paquet téléchargé"),
    ("package_not_found", "Paquet introuvable"),
    ("invalid_request", "Requête invalide"),
    ("internal_error", "Erreur interne du serveur"),
];

/// Returns true if a dedicated built-in set exists for `code`.
pub fn has_builtin(code: &str) -> bool {
    matches!(code, "en" | "ru" | "de" | "fr")
}

/// Build the built-in table for `code`.
///
/// Codes without a dedicated set get the English one.
pub fn builtin_translations(code: &str) -> TranslationTable {
    let entries = match code {
        "ru" => RUSSIAN,
        "de" => GERMAN,
        "fr" => FRENCH,
        _ => ENGLISH,
    };

    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
