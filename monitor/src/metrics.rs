//! Metric sample data model
//!
//! A [`MetricSample`] is one tick's worth of placeholder gauges for the host,
//! every agent, every MCP server and every workflow in the inventory. The
//! serialized shape is what lands in the daily `metrics-YYYY-MM-DD.json` files
//! and in `realtime-metrics.json`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health state reported for agents and MCP servers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sampled snapshot of every metric group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// When the sample was taken
    pub timestamp: DateTime<Utc>,

    /// Host level gauges
    pub system: SystemMetrics,

    /// Per-agent gauges keyed by agent name
    pub agents: BTreeMap<String, AgentMetrics>,

    /// Per-server gauges keyed by MCP server name
    #[serde(rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, McpServerMetrics>,

    /// Per-workflow gauges keyed by workflow name
    pub workflows: BTreeMap<String, WorkflowMetrics>,
}

impl MetricSample {
    /// Number of MCP servers reporting healthy
    pub fn healthy_server_count(&self) -> usize {
        self.mcp_servers
            .values()
            .filter(|server| server.status.is_healthy())
            .count()
    }
}

/// Host level gauges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub process: ProcessMetrics,

    /// Host uptime in seconds
    pub uptime: u64,

    pub platform: String,
    pub arch: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub load_average: f64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub total_mb: u64,
    pub used_mb: u64,
    pub free_mb: u64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessMetrics {
    pub heap_used_mb: u64,
    pub heap_total_mb: u64,
    pub rss_mb: u64,
    pub cpu_user_ms: u64,
    pub cpu_system_ms: u64,
}

/// Agent gauges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub status: HealthStatus,
    pub response_time_ms: f64,
    pub success_rate: f64,
    pub last_used: DateTime<Utc>,
    pub coordination_score: f64,
    pub error_count: u32,
}

/// MCP server gauges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerMetrics {
    pub status: HealthStatus,
    pub response_time_ms: f64,
    pub availability_percent: f64,
    pub throughput_qps: f64,
    pub error_rate: f64,
    pub security_status: String,
}

/// Workflow gauges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetrics {
    pub executions_last_hour: u32,
    pub avg_duration_ms: f64,
    pub success_rate: f64,
    pub parallel_efficiency: f64,
    pub resource_utilization: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Unhealthy).unwrap();
        assert_eq!(json, "\"unhealthy\"");
        assert!(HealthStatus::Healthy.is_healthy());
        assert!(!HealthStatus::Degraded.is_healthy());
    }

    #[test]
    fn test_sample_uses_mcp_servers_key() {
        let sample = MetricSample {
            timestamp: Utc::now(),
            system: SystemMetrics {
                cpu: CpuMetrics { load_average: 1.25, usage_percent: 12.0 },
                memory: MemoryMetrics {
                    total_mb: 16384,
                    used_mb: 8192,
                    free_mb: 8192,
                    usage_percent: 50.0,
                },
                process: ProcessMetrics {
                    heap_used_mb: 20,
                    heap_total_mb: 40,
                    rss_mb: 60,
                    cpu_user_ms: 100,
                    cpu_system_ms: 10,
                },
                uptime: 3600,
                platform: "linux".to_string(),
                arch: "x86_64".to_string(),
            },
            agents: BTreeMap::new(),
            mcp_servers: BTreeMap::new(),
            workflows: BTreeMap::new(),
        };

        let value = serde_json::to_value(&sample).unwrap();
        assert!(value.get("mcpServers").is_some());
        assert!(value.get("mcp_servers").is_none());
        assert_eq!(value["system"]["cpu"]["load_average"], 1.25);
    }
}
