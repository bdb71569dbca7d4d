//! MCP observability monitor library
//!
//! Periodically samples placeholder health metrics for the configured agents,
//! MCP servers and workflows, persists them as dated JSON logs, raises alerts
//! on static threshold breaches, prunes old logs and writes a dashboard report.

pub mod config;
pub mod error;
pub mod metrics;
pub mod health;
pub mod sampler;
pub mod store;
pub mod alerts;
pub mod retention;
pub mod report;
pub mod service;

// Re-export commonly used types
pub use config::{AlertThresholds, Inventory, MonitorConfig};
pub use error::{ConfigError, MonitorError, Result, StorageError};
pub use health::{HealthChecker, SimulatedHealthChecker};
pub use metrics::{HealthStatus, MetricSample};
pub use alerts::{Alert, AlertEvaluator, AlertKind, AlertLog, AlertNotifier, LogNotifier, Severity};
pub use report::DashboardReport;
pub use service::{MonitorService, ServiceStatus, TickOutcome};
