//! Command-line and environment overrides.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::config::loader::ConfigError;
use crate::config::schema::ForwarderConfig;
use crate::config::validation::validate_config;

/// Forward /api and /health requests to a configured backend.
#[derive(Debug, Clone, Parser)]
#[command(name = "edge-forwarder", version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "FORWARDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides `backend.base_url`.
    #[arg(long, env = "FORWARDER_BACKEND_URL")]
    pub backend_url: Option<Url>,

    /// Bind address, overrides `listener.bind_address`.
    #[arg(long, env = "FORWARDER_BIND")]
    pub bind: Option<String>,

    /// Reload the configuration file when it changes.
    #[arg(long, env = "FORWARDER_WATCH", default_value_t = false)]
    pub watch: bool,
}

impl Cli {
    /// Apply the flag overrides on top of a file (or default) configuration.
    pub fn apply(&self, mut config: ForwarderConfig) -> ForwarderConfig {
        if let Some(url) = &self.backend_url {
            config.backend.base_url = url.clone();
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        config
    }

    /// Apply the overrides, then validate. Startup and every reload go
    /// through here so both see the same effective configuration.
    pub fn resolve(&self, config: ForwarderConfig) -> Result<ForwarderConfig, ConfigError> {
        let config = self.apply(config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}
