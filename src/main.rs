use anyhow::Result;
use repo_locale::config::Config;
use repo_locale::i18n::{self, LocalizationService};
use repo_locale::t;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("repo_locale=info".parse()?),
        )
        .init();

    // Load configuration from environment
    let config = Config::from_env()?;

    // Build the localization service and make it available process-wide
    let service = LocalizationService::from_config(&config);
    info!(
        "Translations from {} source, languages: {}",
        service.source_kind(),
        service.supported_languages().join(", ")
    );
    i18n::set_global(service);

    info!("{}", t!("server_started", config.port));

    tokio::signal::ctrl_c().await?;

    info!("{}", t!("server_stopped"));
    info!("Localization metrics: {:?}", i18n::global().metrics());

    Ok(())
}
