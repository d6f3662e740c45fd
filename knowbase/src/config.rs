//! Client configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides. The
//! file path defaults to `knowbase.yaml` but can be specified via the `-f` flag or the
//! `KNOWBASE_CONFIG` environment variable. A missing file is not an error; defaults apply.
//!
//! ## Loading Priority
//!
//! 1. **Defaults** - see the `Default` implementations below
//! 2. **YAML config file** - base configuration
//! 3. **Environment variables** - variables prefixed with `KNOWBASE_` override YAML values
//!
//! Nested values use double underscores, e.g. `KNOWBASE_CLIENT__BASE_URL=http://kb:8080/api`
//! sets `client.base_url`.
//!
//! ## Example
//!
//! ```yaml
//! client:
//!   base_url: http://localhost:8080/api
//!   request_timeout: 30s
//! log_filter: info
//! ```

use clap::{Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;

/// Command-line interface for the `knowbase` binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "KNOWBASE_CONFIG", default_value = "knowbase.yaml", global = true)]
    pub config: String,

    /// Validate configuration and exit without contacting the backend.
    #[arg(long, global = true)]
    pub validate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Probe the backend health endpoint
    Health,
    /// Send a chat message to the AI backend
    Chat {
        /// Message text (at most 2000 characters)
        message: String,
    },
    /// Upload a document for indexing
    Upload {
        /// Path of the document to upload
        path: PathBuf,
    },
}

/// Root configuration structure loaded from YAML and environment variables.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP client settings
    pub client: ClientConfig,
    /// Log filter used when `RUST_LOG` is unset (e.g. "info", "knowbase=debug")
    pub log_filter: String,
}

/// Settings for the HTTP client talking to the KnowBase API.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` prefix
    pub base_url: Url,
    /// Per-request timeout, covering connect, send and the full response body
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080/api";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            ..Default::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(Self::DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<(), Error> {
        if self.client.request_timeout.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: client.request_timeout must be greater than zero".to_string(),
            });
        }

        match self.client.base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::Internal {
                    operation: format!("Config validation: client.base_url must use http or https, got '{other}'"),
                });
            }
        }

        if self.client.base_url.cannot_be_a_base() {
            return Err(Error::Internal {
                operation: format!("Config validation: client.base_url '{}' cannot be used as a base URL", self.client.base_url),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values
            .merge(Env::prefixed("KNOWBASE_").ignore(&["CONFIG"]).split("__"))
    }
}
