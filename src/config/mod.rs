//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `PITCH_COACH` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use pitch_coach::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod server;

pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::domain::coach::FlowConfig;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment
/// variables. The flow tables themselves live in
/// [`crate::domain::coach::FlowConfig`]; this struct only knows where to
/// find an optional override file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Optional path to a YAML flow file overriding the built-in tables
    #[serde(default)]
    pub flow_file: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PITCH_COACH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PITCH_COACH__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PITCH_COACH__FLOW_FILE=flow.yaml` -> `flow_file = flow.yaml`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PITCH_COACH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(path) = &self.flow_file {
            if path.trim().is_empty() {
                return Err(ValidationError::EmptyFlowFilePath);
            }
        }
        Ok(())
    }

    /// Load the flow tables: from the configured file if set, otherwise
    /// the built-in defaults.
    ///
    /// Any flow-file failure is fatal; the server must not start against
    /// broken tables.
    pub fn load_flow(&self) -> Result<FlowConfig, ConfigError> {
        match &self.flow_file {
            Some(path) => Ok(FlowConfig::from_yaml_file(path)?),
            None => Ok(FlowConfig::built_in().clone()),
        }
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
