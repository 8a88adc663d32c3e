use crate::error::ConfigError;
use crate::settings::Config;
use config::builder::DefaultState;
use config::ConfigBuilder;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{DatabaseSettings, LoggingSettings, ServerSettings};

/// File read when no explicit path is given. It is optional.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix of environment overrides, e.g. `PERSONNEL__DATABASE__PASSWORD`.
pub const ENV_PREFIX: &str = "PERSONNEL";

/// Loads the application configuration.
///
/// Sources, later ones overriding earlier ones: built-in defaults, the TOML
/// file (`config.toml` unless `path` is given, in which case it must exist),
/// then `PERSONNEL__*` environment variables. A `.env` file, if present, is
/// loaded into the environment first.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
    };

    let builder = defaults()?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

/// Built-in defaults, matching the conventional local deployment.
fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(config::Config::builder()
        .set_default("server.host", "localhost")?
        .set_default("server.port", 33056_i64)?
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432_i64)?
        .set_default("database.user", "postgres")?
        .set_default("database.password", "")?
        .set_default("database.database", "rh_socket_system")?
        .set_default("database.max_connections", 10_i64)?
        .set_default("database.acquire_timeout_secs", 5_i64)?
        .set_default("logging.level", "info")?
        .set_default("logging.json", false)?)
}
