use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::interpreter::{DEFAULT_SOURCE_MARKER, InterpreterConfig, SOURCE_PLACEHOLDER};

pub mod interpreter;
mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../snipcheck.example.toml");

/// Prefix for environment overrides, e.g. `SNIPCHECK__RESOLVER__MODEL`
pub const ENV_PREFIX: &str = "SNIPCHECK";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for Snipcheck
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// How submissions are run
    pub interpreter: InterpreterConfig,

    /// Remote line resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// HTTP front end settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Create a new config from the embedded defaults
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

/// Settings for the Gemini-backed line resolver
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Query the remote service before falling back to trace scanning
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Model name passed to `generateContent`
    #[serde(default = "default_model")]
    pub model: String,

    /// API root, without the `/models/...` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Settings for the HTTP front end
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Allow any origin, method and header
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("bad bind_addr '{}': {e}", self.bind_addr)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "gemini-2.5-flash".to_owned()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_owned()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_owned()
}
