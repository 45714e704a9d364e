//! Configuration management

use hookstack_core::Settings;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Pretty-print the descriptor list
    #[serde(default)]
    pub pretty: bool,

    /// Prepend the queue IAM statement to the descriptor list
    #[serde(default)]
    pub permissions: bool,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Without an explicit path an optional `hookstack.{toml,json,yaml}` in the
    /// working directory is used. `HOOKSTACK_SETTINGS__SERVICE_NAME` style
    /// variables override file values.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("hookstack").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("HOOKSTACK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize::<Config>()?)
    }
}
