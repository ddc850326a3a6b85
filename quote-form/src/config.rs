use crate::error::{FormError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub form: FormConfig,
    pub admin: AdminConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Absolute base URL (e.g. `https://quotes.example.com`) used in the
    /// embeddable form; empty means root-relative links
    #[serde(default)]
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FormConfig {
    /// Key for the HMAC behind form nonces
    pub csrf_secret: String,
    #[serde(default = "default_csrf_lifetime")]
    pub csrf_lifetime_secs: u64,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Fallback recipient when the settings record has none
    pub email: String,
    /// Argon2 PHC string; an empty value disables the admin pages
    #[serde(default)]
    pub password_hash: String,
    pub session_secret: String,
    #[serde(default = "default_session_hours")]
    pub session_hours: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub settings_path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_site_name() -> String {
    "Quote Request".to_string()
}

fn default_csrf_lifetime() -> u64 {
    24 * 3600
}

fn default_rate_limit() -> u32 {
    10
}

fn default_session_hours() -> u64 {
    12
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FormError::Config(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| FormError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would leave nonces or sessions unsigned
    pub fn validate(&self) -> Result<()> {
        if self.form.csrf_secret.is_empty() {
            return Err(FormError::Config("form.csrf_secret must not be empty".to_string()));
        }
        if self.admin.session_secret.is_empty() {
            return Err(FormError::Config(
                "admin.session_secret must not be empty".to_string(),
            ));
        }
        if self.form.csrf_lifetime_secs < 2 {
            return Err(FormError::Config(
                "form.csrf_lifetime_secs must be at least 2".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "127.0.0.1:8080".to_string(),
                site_name: default_site_name(),
                public_url: String::new(),
            },
            form: FormConfig {
                csrf_secret: "change-me-in-production".to_string(),
                csrf_lifetime_secs: default_csrf_lifetime(),
                rate_limit_per_minute: default_rate_limit(),
            },
            admin: AdminConfig {
                email: "admin@localhost.localdomain".to_string(),
                password_hash: String::new(),
                session_secret: "change-me-in-production".to_string(),
                session_hours: default_session_hours(),
            },
            storage: StorageConfig {
                settings_path: "data/settings.json".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
listen_addr = "0.0.0.0:9000"

[form]
csrf_secret = "s3cret"

[admin]
email = "owner@example.com"
session_secret = "other"

[storage]
settings_path = "/var/lib/quote-form/settings.json"

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.server.site_name, "Quote Request");
        assert!(config.server.public_url.is_empty());
        assert_eq!(config.form.csrf_lifetime_secs, 86400);
        assert_eq!(config.form.rate_limit_per_minute, 10);
        assert!(config.admin.password_hash.is_empty());
        assert_eq!(config.admin.session_hours, 12);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = Config::default();
        config.form.csrf_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/nonexistent/quote-form.toml");
        assert!(matches!(result, Err(FormError::Config(_))));
    }
}
