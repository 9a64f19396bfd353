mod settings;

use config::{Config, ConfigError, Environment, File};

use settings::PartialSettings;

pub use settings::{DeployMode, LogSettings, OriginSettings, ServerSettings, Settings};

/// Default location of the optional configuration file, without extension.
pub const DEFAULT_CONFIG_PATH: &str = "config/default";

/// Loads `path` (optional, any format the `config` crate knows) and then
/// `RELAY_*` environment variables, e.g. `RELAY_SERVER__PORT=9000`.
/// List values in the environment are comma-separated.
/// Whatever is missing falls back to `Settings::default()`.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let environment = Environment::with_prefix("RELAY")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("origins.exact_origins")
        .with_list_parse_key("origins.allowed_hosts")
        .with_list_parse_key("origins.allowed_host_suffixes");

    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(environment);

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}
