//! Configuration management for the MCP observability monitor
//!
//! Configuration is assembled once at start-up from built-in defaults, an
//! optional TOML file and `MCP_MONITOR__*` environment variables, then
//! validated and treated as immutable for the life of the process.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Environment variable prefix for overrides (`MCP_MONITOR__RETENTION_DAYS=7`)
pub const ENV_PREFIX: &str = "MCP_MONITOR";

/// Main configuration structure for the monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Sampling interval in milliseconds
    pub metrics_interval_ms: u64,

    /// Sampling interval used with `--fast`
    pub fast_interval_ms: u64,

    /// Days a daily metrics file is kept
    pub retention_days: u32,

    /// Directory holding daily metrics, snapshot, alerts and report files
    pub log_dir: PathBuf,

    /// Maximum number of alerts kept in memory and in `alerts.json`
    pub max_alerts: usize,

    /// Static alert thresholds
    pub alert_thresholds: AlertThresholds,

    /// Entities the sampler reports on
    pub inventory: Inventory,
}

/// Static alert thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertThresholds {
    /// CPU usage percent
    pub cpu_usage: f64,

    /// Memory usage percent
    pub memory_usage: f64,

    /// Agent response time in milliseconds
    pub response_time_ms: f64,

    /// MCP server error rate percent
    pub error_rate: f64,

    /// Agent success rate percent below which an alert fires
    pub min_success_rate: f64,
}

/// Names of the agents, MCP servers and workflows being sampled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inventory {
    pub agents: Vec<String>,
    pub mcp_servers: Vec<String>,
    pub workflows: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            metrics_interval_ms: 30_000,
            fast_interval_ms: 10_000,
            retention_days: 30,
            log_dir: PathBuf::from("logs").join("monitoring"),
            max_alerts: 1000,
            alert_thresholds: AlertThresholds::default(),
            inventory: Inventory::default(),
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu_usage: 80.0,
            memory_usage: 85.0,
            response_time_ms: 5000.0,
            error_rate: 5.0,
            min_success_rate: 95.0,
        }
    }
}

impl Default for Inventory {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            agents: names(&[
                "bmad-orchestrator",
                "bmad-parallel-orchestrator",
                "bmad-analyst",
                "bmad-architect",
                "bmad-dev",
                "bmad-sm",
                "contains-design-ui",
                "contains-eng-frontend",
                "contains-eng-devops",
                "contains-test-analyzer",
            ]),
            mcp_servers: names(&[
                "github",
                "firecrawl",
                "postgresql",
                "redis",
                "notion",
                "shadcn",
                "filesystem",
                "memory",
            ]),
            workflows: names(&[
                "init-prd",
                "init-architecture",
                "shard-stories",
                "run-next-story",
                "qa-gate",
            ]),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file only
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.to_string_lossy().to_string() })?;

        let config: MonitorConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError { reason: e.to_string() })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback order: defaults -> file -> environment
    ///
    /// An explicitly requested file must exist; without one the default
    /// location is used when present.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_env(config_path, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(
        config_path: Option<&Path>,
        environment: config::Environment,
    ) -> ConfigResult<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&MonitorConfig::default())?);

        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.to_string_lossy().to_string(),
                    });
                }
                builder = builder.add_source(
                    config::File::from(path.to_path_buf()).format(config::FileFormat::Toml),
                );
            }
            None => {
                if let Ok(default_path) = Self::default_config_path() {
                    builder = builder.add_source(
                        config::File::from(default_path)
                            .format(config::FileFormat::Toml)
                            .required(false),
                    );
                }
            }
        }

        let settings = builder
            .add_source(environment.separator("__").try_parsing(true))
            .build()?;

        let config: MonitorConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.metrics_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "metrics_interval_ms".to_string(),
                value: "0".to_string(),
            });
        }

        if self.fast_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fast_interval_ms".to_string(),
                value: "0".to_string(),
            });
        }

        if self.retention_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retention_days".to_string(),
                value: "0".to_string(),
            });
        }

        if self.max_alerts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_alerts".to_string(),
                value: "0".to_string(),
            });
        }

        let percentages = [
            ("alert_thresholds.cpu_usage", self.alert_thresholds.cpu_usage),
            ("alert_thresholds.memory_usage", self.alert_thresholds.memory_usage),
            ("alert_thresholds.error_rate", self.alert_thresholds.error_rate),
            ("alert_thresholds.min_success_rate", self.alert_thresholds.min_success_rate),
        ];
        for (field, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }

        if self.alert_thresholds.response_time_ms <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "alert_thresholds.response_time_ms".to_string(),
                value: self.alert_thresholds.response_time_ms.to_string(),
            });
        }

        if self.log_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "log_dir must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Sampling interval, honouring `--fast`
    pub fn interval(&self, fast: bool) -> Duration {
        if fast {
            Duration::from_millis(self.fast_interval_ms)
        } else {
            Duration::from_millis(self.metrics_interval_ms)
        }
    }

    /// Sibling `alerts` directory created next to the monitoring directory
    pub fn alerts_dir(&self) -> PathBuf {
        match self.log_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join("alerts"),
            _ => PathBuf::from("alerts"),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("mcp-toolkit").join("mcp-monitor.toml"))
            .ok_or_else(|| ConfigError::ValidationFailed {
                reason: "Unable to determine config directory".to_string(),
            })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_| ConfigError::ValidationFailed {
                reason: format!("Unable to create config directory: {}", parent.display()),
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ValidationFailed { reason: e.to_string() })?;

        fs::write(path, content).map_err(|e| ConfigError::ValidationFailed {
            reason: format!("Unable to write {}: {}", path.display(), e),
        })?;

        Ok(())
    }
}
