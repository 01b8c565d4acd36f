//! Configuration loading, validation, and environment-based overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> EngineResult<EngineConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    /// Load configuration from a TOML document.
    pub fn load_from_str(content: &str) -> EngineResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables, layered over
    /// defaults.
    pub fn load_from_env() -> EngineResult<EngineConfig> {
        let mut config = EngineConfig::default();

        if let Ok(val) = std::env::var("PROCESS_ENGINE_SERVICE_NAME") {
            config.service.name = val;
        }
        if let Ok(val) = std::env::var("PROCESS_ENGINE_LOG_LEVEL") {
            config.logging.level = val;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Service identity.
    pub service: ServiceConfig,
    /// Logging behavior.
    pub logging: LoggingConfig,
    /// Stepping engine limits.
    pub stepping: SteppingConfig,
}

impl EngineConfig {
    /// Validate every sub-config.
    pub fn validate(&self) -> EngineResult<()> {
        self.service.validate()?;
        self.logging.validate()?;
        self.stepping.validate()?;
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            logging: LoggingConfig::default(),
            stepping: SteppingConfig::default(),
        }
    }
}

/// Service identity, surfaced in logs and spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name.
    pub name: String,
    /// Service version.
    pub version: String,
}

impl ServiceConfig {
    /// Validate service configuration.
    pub fn validate(&self) -> EngineResult<()> {
        if self.name.is_empty() {
            return Err(EngineError::InvalidConfig(
                "service name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "process-engine".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Logging behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (`trace`/`debug`/`info`/`warn`/`error`).
    pub level: String,
    /// Emit structured JSON log lines instead of plain text.
    pub json: bool,
}

impl LoggingConfig {
    /// Validate logging configuration.
    pub fn validate(&self) -> EngineResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(EngineError::InvalidConfig(format!(
                "invalid log level: {}",
                self.level
            )));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Stepping engine limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteppingConfig {
    /// Multiplier applied to node count for the path-enumeration cutoff
    /// (see [`crate::graph::Graph::paths`]).
    pub path_cutoff_multiplier: usize,
}

impl SteppingConfig {
    /// Validate stepping configuration.
    pub fn validate(&self) -> EngineResult<()> {
        if self.path_cutoff_multiplier == 0 {
            return Err(EngineError::InvalidConfig(
                "path_cutoff_multiplier must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SteppingConfig {
    fn default() -> Self {
        Self {
            path_cutoff_multiplier: 3,
        }
    }
}
