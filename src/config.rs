use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub import: ImportSettings,
    pub cors: CorsSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Directory the front-end UI is served from
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportSettings {
    /// Largest accepted CSV upload, in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
}

pub const ENV_PREFIX: &str = "SHUTDOWN_MANAGER";
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("application.host", "127.0.0.1")?
            .set_default("application.port", 5001)?
            .set_default("application.environment", environment.clone())?
            .set_default("application.static_dir", "static")?
            .set_default("database.url", "sqlite://shutdown_manager.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("logging.level", "debug")?
            .set_default("logging.format", "pretty")?
            .set_default("import.max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES)?
            .set_default(
                "cors.allowed_origins",
                vec!["http://localhost:8000", "http://127.0.0.1:8000"],
            )?
            // Add configuration file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }
}
