//! CLI tool for quote-form administration
//!
//! # Usage
//!
//! ```bash
//! # Hash the admin password for `admin.password_hash`
//! quote-form-admin hash-password 'correct horse battery staple'
//!
//! # Validate a configuration file
//! quote-form-admin check-config --config quote-form.toml
//!
//! # Print the stored settings (password masked)
//! quote-form-admin show-settings --config quote-form.toml
//! ```

use clap::{Parser, Subcommand};
use quote_form::api::auth::hash_password;
use quote_form::config::Config;
use quote_form::settings::SettingsStore;

#[derive(Parser)]
#[command(name = "quote-form-admin")]
#[command(about = "Administer the quote form service", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "quote-form.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an Argon2 hash of a password
    HashPassword {
        /// Admin password
        password: String,
    },
    /// Load and validate the configuration file
    CheckConfig,
    /// Print the stored settings record
    ShowSettings,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::HashPassword { password } => {
            if password.is_empty() {
                eprintln!("Error: password must not be empty");
                std::process::exit(1);
            }
            println!("{}", hash_password(&password)?);
        }
        Commands::CheckConfig => {
            let config = Config::from_file(&cli.config)?;
            println!("✓ {} is valid", cli.config);
            println!("  Listening on:  {}", config.server.listen_addr);
            println!("  Settings file: {}", config.storage.settings_path);
            if config.admin.password_hash.is_empty() {
                println!("  Admin pages:   disabled (no password hash)");
            } else {
                println!("  Admin pages:   enabled");
            }
        }
        Commands::ShowSettings => {
            let config = Config::from_file(&cli.config)?;
            let store = SettingsStore::new(config.storage.settings_path.clone());
            let mut settings = store.load().await?;
            if !settings.smtp_pass.is_empty() {
                settings.smtp_pass = "********".to_string();
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}
