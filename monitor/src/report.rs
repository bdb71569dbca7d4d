//! Dashboard report assembled from in-memory monitor state

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::alerts::{Alert, AlertLog, Severity};
use crate::metrics::{AgentMetrics, McpServerMetrics, MetricSample, SystemMetrics, WorkflowMetrics};

const STANDING_RECOMMENDATIONS: [&str; 3] = [
    "Monitor CPU and memory usage during peak hours",
    "Review agent coordination patterns for optimization opportunities",
    "Ensure MCP server health checks are passing consistently",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub timestamp: DateTime<Utc>,
    pub summary: ReportSummary,
    pub metrics: ReportMetrics,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// `healthy`, or `degraded` when critical alerts were raised in the last 24 hours
    pub system_health: String,
    pub active_agents: usize,
    pub mcp_servers_healthy: usize,
    pub alerts_last_24h: usize,
    pub uptime_hours: u64,
}

/// Latest sampled groups plus the retained alert list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub agents: BTreeMap<String, AgentMetrics>,

    #[serde(rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, McpServerMetrics>,

    pub workflows: BTreeMap<String, WorkflowMetrics>,
    pub system: Option<SystemMetrics>,
    pub alerts: Vec<Alert>,
}

/// Inputs for [`build_report`]
pub struct ReportInputs<'a> {
    pub alerts: &'a AlertLog,
    pub latest: Option<&'a MetricSample>,
    pub agent_count: usize,
    pub server_count: usize,
    pub uptime_secs: u64,
}

pub fn build_report(inputs: ReportInputs<'_>, now: DateTime<Utc>) -> DashboardReport {
    let recent: Vec<&Alert> = inputs.alerts.recent(now, Duration::hours(24)).collect();
    let critical = recent.iter().any(|alert| alert.severity == Severity::Critical);

    let summary = ReportSummary {
        system_health: if critical { "degraded" } else { "healthy" }.to_string(),
        active_agents: inputs.agent_count,
        mcp_servers_healthy: inputs
            .latest
            .map(MetricSample::healthy_server_count)
            .unwrap_or(inputs.server_count),
        alerts_last_24h: recent.len(),
        uptime_hours: inputs.uptime_secs / 3600,
    };

    let metrics = match inputs.latest {
        Some(sample) => ReportMetrics {
            agents: sample.agents.clone(),
            mcp_servers: sample.mcp_servers.clone(),
            workflows: sample.workflows.clone(),
            system: Some(sample.system.clone()),
            alerts: inputs.alerts.to_vec(),
        },
        None => ReportMetrics {
            agents: BTreeMap::new(),
            mcp_servers: BTreeMap::new(),
            workflows: BTreeMap::new(),
            system: None,
            alerts: inputs.alerts.to_vec(),
        },
    };

    DashboardReport {
        timestamp: now,
        summary,
        metrics,
        recommendations: recommendations(recent.len()),
    }
}

pub fn recommendations(recent_alerts: usize) -> Vec<String> {
    let mut recommendations = Vec::with_capacity(STANDING_RECOMMENDATIONS.len() + 1);

    if recent_alerts == 0 {
        recommendations.push("System is running optimally with no recent alerts".to_string());
    } else {
        recommendations.push(format!(
            "Review and address {} alerts from last 24 hours",
            recent_alerts
        ));
    }

    recommendations.extend(STANDING_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertKind;

    fn inputs(log: &AlertLog) -> ReportInputs<'_> {
        ReportInputs {
            alerts: log,
            latest: None,
            agent_count: 10,
            server_count: 8,
            uptime_secs: 7 * 3600 + 59,
        }
    }

    #[test]
    fn test_empty_state_report() {
        let log = AlertLog::new(1000);
        let report = build_report(inputs(&log), Utc::now());

        assert_eq!(report.summary.system_health, "healthy");
        assert_eq!(report.summary.alerts_last_24h, 0);
        assert_eq!(report.summary.active_agents, 10);
        assert_eq!(report.summary.mcp_servers_healthy, 8);
        assert_eq!(report.summary.uptime_hours, 7);
        assert_eq!(report.recommendations.len(), 4);
        assert_eq!(
            report.recommendations[0],
            "System is running optimally with no recent alerts"
        );
    }

    #[test]
    fn test_only_recent_alerts_are_counted() {
        let now = Utc::now();
        let mut log = AlertLog::new(1000);
        log.push(Alert::new(AlertKind::CpuHigh, Severity::High, "stale", now - Duration::hours(30)));
        log.push(Alert::new(AlertKind::CpuHigh, Severity::High, "fresh", now - Duration::minutes(5)));
        log.push(Alert::new(AlertKind::MemoryHigh, Severity::High, "fresh", now));

        let report = build_report(inputs(&log), now);

        assert_eq!(report.summary.alerts_last_24h, 2);
        assert_eq!(report.metrics.alerts.len(), 3);
        assert_eq!(
            report.recommendations[0],
            "Review and address 2 alerts from last 24 hours"
        );
    }

    #[test]
    fn test_recent_critical_alert_degrades_health() {
        let now = Utc::now();
        let mut log = AlertLog::new(1000);
        log.push(Alert::new(AlertKind::McpServerUnhealthy, Severity::Critical, "down", now));

        let report = build_report(inputs(&log), now);
        assert_eq!(report.summary.system_health, "degraded");
    }

    #[test]
    fn test_report_serialization_keys() {
        let log = AlertLog::new(1000);
        let value = serde_json::to_value(build_report(inputs(&log), Utc::now())).unwrap();

        assert!(value["metrics"].get("mcpServers").is_some());
        assert!(value["summary"].get("alerts_last_24h").is_some());
        assert!(value["recommendations"].is_array());
    }
}
