//! Configuration management for the audit engine
//!
//! TOML file, then `ZAPWAY_*` environment overrides, then validation.

use crate::errors::{AuditResult, ConfigurationError};
use crate::games::types::{MinesCount, PlinkoRows};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Top-level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub engine: EngineConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Verification engine settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay inserted before dispatching a run. Purely cosmetic pacing.
    pub pacing_delay_ms: u64,
    pub default_plinko_rows: u32,
    pub default_mines_count: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing_delay_ms: 0,
            default_plinko_rows: 16,
            default_mines_count: 3,
        }
    }
}

/// HTTP surface settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "zapway_audit=info,tower_http=info".to_string(),
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> AuditResult<AuditConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            AuditConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> AuditResult<AuditConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    fn apply_env_overrides(&self, config: &mut AuditConfig) -> AuditResult<()> {
        if let Ok(host) = env::var("ZAPWAY_API_HOST") {
            config.api.host = host;
        }
        if let Ok(port) = env::var("ZAPWAY_API_PORT") {
            config.api.port = port.parse()
                .map_err(|_| ConfigurationError::InvalidValue {
                    field: "ZAPWAY_API_PORT".to_string(),
                    value: port,
                    reason: "Invalid port number".to_string(),
                })?;
        }
        if let Ok(delay) = env::var("ZAPWAY_PACING_DELAY_MS") {
            config.engine.pacing_delay_ms = delay.parse()
                .map_err(|_| ConfigurationError::InvalidValue {
                    field: "ZAPWAY_PACING_DELAY_MS".to_string(),
                    value: delay,
                    reason: "Invalid delay in milliseconds".to_string(),
                })?;
        }
        if let Ok(filter) = env::var("ZAPWAY_LOG_FILTER") {
            config.logging.filter = filter;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self, config: &AuditConfig) -> AuditResult<()> {
        if config.api.port == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "api.port".to_string(),
                value: "0".to_string(),
                reason: "Port cannot be zero".to_string(),
            }.into());
        }

        if config.api.request_timeout_secs == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "api.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            }.into());
        }

        if let Err(e) = PlinkoRows::try_from(config.engine.default_plinko_rows) {
            return Err(ConfigurationError::InvalidValue {
                field: "engine.default_plinko_rows".to_string(),
                value: config.engine.default_plinko_rows.to_string(),
                reason: e.to_string(),
            }.into());
        }

        if let Err(e) = MinesCount::new(config.engine.default_mines_count) {
            return Err(ConfigurationError::InvalidValue {
                field: "engine.default_mines_count".to_string(),
                value: config.engine.default_mines_count.to_string(),
                reason: e.to_string(),
            }.into());
        }

        if config.logging.filter.trim().is_empty() {
            return Err(ConfigurationError::ValidationFailed("logging.filter cannot be empty".to_string()).into());
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &AuditConfig, path: &str) -> AuditResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> AuditResult<()> {
    ConfigLoader::new().save(&AuditConfig::default(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.engine.default_plinko_rows, 16);
        assert_eq!(config.engine.default_mines_count, 3);
        assert_eq!(config.engine.pacing_delay_ms, 0);
    }

    #[test]
    fn test_config_validation() {
        let loader = ConfigLoader::new();
        let mut config = AuditConfig::default();

        assert!(loader.validate(&config).is_ok());

        config.engine.default_plinko_rows = 9;
        assert!(loader.validate(&config).is_err());

        config.engine.default_plinko_rows = 8;
        config.engine.default_mines_count = 25;
        assert!(loader.validate(&config).is_err());

        config.engine.default_mines_count = 24;
        config.api.port = 0;
        assert!(loader.validate(&config).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AuditConfig = toml::from_str("[api]\nport = 9090\n").unwrap();
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.engine.default_plinko_rows, 16);
    }

    #[test]
    fn test_save_and_load_config() -> AuditResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let mut original = AuditConfig::default();
        original.engine.default_mines_count = 5;
        original.api.request_timeout_secs = 12;

        let loader = ConfigLoader::new();
        loader.save(&original, path)?;

        let loaded = ConfigLoader::new().with_path(path).load_from_file(path)?;
        assert_eq!(loaded.engine.default_mines_count, 5);
        assert_eq!(loaded.api.request_timeout_secs, 12);

        Ok(())
    }
}
