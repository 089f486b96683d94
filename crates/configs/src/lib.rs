//! # configs
//!
//! Process-wide settings, read once at startup and immutable afterwards.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. a TOML file (`config/kxpage.toml`, or the path in `KXPAGE_CONFIG`), optional
//! 3. environment variables such as `KXPAGE_ADMIN__SECRET` or
//!    `KXPAGE_SERVER__BIND`, including those from a `.env` file

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

pub const ENV_PREFIX: &str = "KXPAGE";
pub const CONFIG_PATH_VAR: &str = "KXPAGE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "config/kxpage.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub admin: AdminSettings,
    pub log: LogSettings,
    /// The `.env` file that was applied, if any. Reported by the caller
    /// once logging is up.
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// Listen address, e.g. "0.0.0.0:8000".
    pub bind: String,
    /// Largest accepted request body; bounds image uploads.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection url; may embed credentials.
    #[serde(deserialize_with = "secret")]
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    pub image_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct AdminSettings {
    /// Shared secret whose SHA-512 digest authorizes privileged calls.
    #[serde(deserialize_with = "secret")]
    pub secret: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

impl Settings {
    /// Loads `.env`, the optional config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env_file = dotenvy::dotenv().ok();
        let file = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let mut settings: Settings = defaults()?
            .add_source(File::from(Path::new(&file)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        settings.env_file = env_file;
        Ok(settings)
    }

    /// Defaults overlaid with a TOML document, without touching the
    /// environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let settings: Settings = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.secret.expose_secret().is_empty() {
            return Err(ConfigError::Invalid("admin.secret must not be empty".into()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_upload_bytes must be positive".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be positive".into()));
        }
        Ok(())
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("server.bind", "127.0.0.1:8000")?
        .set_default("server.max_upload_bytes", 16_i64 * 1024 * 1024)?
        .set_default("database.url", "sqlite://kxpage.db?mode=rwc")?
        .set_default("database.max_connections", 5_i64)?
        .set_default("storage.image_dir", "./images")?
        .set_default("log.format", "pretty")?)
}
