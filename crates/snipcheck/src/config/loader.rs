//! Configuration file loading for Snipcheck
//!
//! Handles layering the embedded defaults, an optional file and environment
//! overrides using the config crate.

use std::path::Path;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};

use crate::config::{Config, ConfigError, ENV_PREFIX, EXAMPLE_CONFIG};

impl Config {
    /// Load configuration from a file on top of the embedded defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(EXAMPLE_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()?;

        Self::finish(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        Self::finish(config)
    }

    /// Load the full layered configuration
    ///
    /// Order: embedded defaults, then `path` if given, then `SNIPCHECK__*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .add_source(File::from_str(EXAMPLE_CONFIG, FileFormat::Toml));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    fn finish(config: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.interpreter.name.is_empty() {
            return Err(ConfigError::Invalid("interpreter has empty name".to_owned()));
        }
        if self.interpreter.command.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter has empty command".to_owned(),
            ));
        }
        if self.interpreter.source_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter has empty source_marker".to_owned(),
            ));
        }
        if self.resolver.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "resolver timeout_secs must be positive".to_owned(),
            ));
        }
        self.server.socket_addr()?;

        Ok(())
    }
}
