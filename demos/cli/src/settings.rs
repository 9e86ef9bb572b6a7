use std::path::Path;

use notifier_core::NotifierConfig;

/// Defaults, then the optional TOML file, then `NOTIFIER_*` variables
/// (`NOTIFIER_WEATHER__API_KEY` sets `weather.api_key`).
pub fn load_config(path: Option<&Path>) -> Result<NotifierConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder
        .add_source(
            config::Environment::with_prefix("NOTIFIER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
