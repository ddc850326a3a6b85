use anyhow::Context;
use quote_form::api::ApiServer;
use quote_form::config::Config;
use quote_form::smtp::SmtpMailer;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_PATH: &str = "quote-form.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so its level and format apply
    let config_path =
        std::env::var("QUOTE_FORM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let (config, from_file) = if Path::new(&config_path).exists() {
        let config = Config::from_file(&config_path)
            .with_context(|| format!("Failed to load configuration from {}", config_path))?;
        (config, true)
    } else {
        (Config::default(), false)
    };

    init_logging(&config);

    info!("Starting quote-form v{}", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Configuration loaded from {}", config_path);
    } else {
        warn!("No config file at {}, using development defaults", config_path);
    }
    info!("  Listening on: {}", config.server.listen_addr);
    info!("  Settings file: {}", config.storage.settings_path);
    if config.admin.password_hash.is_empty() {
        warn!("admin.password_hash is empty, the settings page is disabled");
    }

    let server = ApiServer::new(&config, Arc::new(SmtpMailer));
    server.run().await.context("Server error")?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("quote_form={},tower_http=info", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
