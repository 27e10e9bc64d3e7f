use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    DatabaseSettings, LogFormat, LoggingSettings, ServerSettings, Settings, StorageSettings,
};

/// Prefix of the environment variables that override file settings,
/// e.g. `RACING__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "RACING";

/// Loads the application configuration from `config.toml`.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config.toml")
}

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the optional file at
/// `path`, `RACING__*` environment variables, and finally `DATABASE_URL`.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("server.body_limit_bytes", 50_i64 * 1024 * 1024)?
        .set_default("server.default_scheme", "http")?
        .set_default("database.url", "sqlite://racing.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.root", "wwwroot")?
        .set_default("logging.filter", "info")?
        .set_default("logging.format", "compact")?
        .set_default("logging.file_prefix", "racing.log")?
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
