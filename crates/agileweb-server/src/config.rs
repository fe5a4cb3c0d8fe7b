//! Server configuration

use agileweb_core::InputLimits;
use agileweb_policy::EngineConfig;
use agileweb_telemetry::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Decision engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Caps applied to every evaluation request
    #[serde(default)]
    pub limits: InputLimits,

    /// Records kept in the audit log and the blocked attempt history
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        // A missing file means defaults
        let mut config = if Path::new(config_path).exists() {
            Self::from_yaml(&std::fs::read_to_string(config_path)?)?
        } else {
            Self::default()
        };

        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.engine.validate()?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            engine: EngineConfig::default(),
            limits: InputLimits::default(),
            audit_capacity: default_audit_capacity(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_audit_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_max_body_bytes() -> usize {
    256 * 1024
}
