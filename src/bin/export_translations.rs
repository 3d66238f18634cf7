//! Export translations binary - writes one language's table to a JSON file
//!
//! Usage:
//!   cargo run --bin export-translations -- ru                     # locale/translations_ru.json
//!   cargo run --bin export-translations -- ru seed/ru.json        # explicit target
//!
//! Uses the same LOCALE_DIR / LOCALE_SOURCE configuration as the server, so a
//! language without a file exports its built-in translations. Handy for
//! seeding a new locale directory.

use anyhow::{Context, Result};
use repo_locale::config::Config;
use repo_locale::i18n::{source::translation_file_name, LocalizationService};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("export_translations=info".parse()?)
                .add_directive("repo_locale=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let code = args
        .next()
        .context("Usage: export-translations <language> [output-path]")?;

    let config = Config::from_env()?;
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.locale_dir.join(translation_file_name(&code)));

    let service = LocalizationService::from_config(&config);
    service
        .save_translations_to_file(&code, &output_path)
        .with_context(|| format!("Failed to export '{}'", code))?;

    let count = service.translations(&code).map(|t| t.len()).unwrap_or(0);
    info!(
        "{}",
        service.get(
            "translations_exported",
            &[
                count.into(),
                code.as_str().into(),
                output_path.display().to_string().into(),
            ],
        )
    );

    Ok(())
}
