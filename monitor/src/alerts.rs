//! Alert records, threshold evaluation and the bounded in-memory alert log

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::AlertThresholds;
use crate::metrics::MetricSample;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert type, serialized as `CPU_HIGH`, `MCP_SERVER_UNHEALTHY`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    CpuHigh,
    MemoryHigh,
    AgentSlowResponse,
    AgentLowSuccessRate,
    McpServerUnhealthy,
    McpHighErrorRate,
    MonitoringError,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::CpuHigh => "CPU_HIGH",
            AlertKind::MemoryHigh => "MEMORY_HIGH",
            AlertKind::AgentSlowResponse => "AGENT_SLOW_RESPONSE",
            AlertKind::AgentLowSuccessRate => "AGENT_LOW_SUCCESS_RATE",
            AlertKind::McpServerUnhealthy => "MCP_SERVER_UNHEALTHY",
            AlertKind::McpHighErrorRate => "MCP_HIGH_ERROR_RATE",
            AlertKind::MonitoringError => "MONITORING_ERROR",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offending value carried by an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlertValue {
    Number(f64),
    Text(String),
}

/// Immutable alert record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: AlertKind,

    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AlertValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: Severity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_alert_id(timestamp),
            kind,
            severity,
            message: message.into(),
            timestamp,
            value: None,
            agent: None,
            server: None,
        }
    }

    pub fn with_value(mut self, value: AlertValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Alert raised when a monitoring step fails
    pub fn monitoring_error(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(AlertKind::MonitoringError, Severity::High, message, timestamp)
    }
}

/// `alert_<unix-millis>_<9 lowercase alphanumerics>`
pub fn generate_alert_id(timestamp: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("alert_{}_{}", timestamp.timestamp_millis(), suffix)
}

/// Compares a sample against static thresholds
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// Every threshold breach in `sample`, stamped with `now`
    ///
    /// No suppression or deduplication: a breach that persists across ticks
    /// raises a new alert every tick.
    pub fn evaluate(&self, sample: &MetricSample, now: DateTime<Utc>) -> Vec<Alert> {
        let t = &self.thresholds;
        let mut alerts = Vec::new();

        let cpu = sample.system.cpu.usage_percent;
        if cpu > t.cpu_usage {
            alerts.push(
                Alert::new(
                    AlertKind::CpuHigh,
                    Severity::High,
                    format!("CPU usage {}% exceeds threshold {}%", cpu, t.cpu_usage),
                    now,
                )
                .with_value(AlertValue::Number(cpu)),
            );
        }

        let memory = sample.system.memory.usage_percent;
        if memory > t.memory_usage {
            alerts.push(
                Alert::new(
                    AlertKind::MemoryHigh,
                    Severity::High,
                    format!("Memory usage {}% exceeds threshold {}%", memory, t.memory_usage),
                    now,
                )
                .with_value(AlertValue::Number(memory)),
            );
        }

        for (agent, metrics) in &sample.agents {
            if metrics.response_time_ms > t.response_time_ms {
                alerts.push(
                    Alert::new(
                        AlertKind::AgentSlowResponse,
                        Severity::Medium,
                        format!(
                            "Agent {} response time {}ms exceeds threshold",
                            agent, metrics.response_time_ms
                        ),
                        now,
                    )
                    .with_agent(agent.as_str())
                    .with_value(AlertValue::Number(metrics.response_time_ms)),
                );
            }

            if metrics.success_rate < t.min_success_rate {
                alerts.push(
                    Alert::new(
                        AlertKind::AgentLowSuccessRate,
                        Severity::High,
                        format!(
                            "Agent {} success rate {}% is below {}%",
                            agent, metrics.success_rate, t.min_success_rate
                        ),
                        now,
                    )
                    .with_agent(agent.as_str())
                    .with_value(AlertValue::Number(metrics.success_rate)),
                );
            }
        }

        for (server, metrics) in &sample.mcp_servers {
            if !metrics.status.is_healthy() {
                alerts.push(
                    Alert::new(
                        AlertKind::McpServerUnhealthy,
                        Severity::Critical,
                        format!("MCP Server {} is {}", server, metrics.status),
                        now,
                    )
                    .with_server(server.as_str())
                    .with_value(AlertValue::Text(metrics.status.to_string())),
                );
            }

            if metrics.error_rate > t.error_rate {
                alerts.push(
                    Alert::new(
                        AlertKind::McpHighErrorRate,
                        Severity::High,
                        format!(
                            "MCP Server {} error rate {}% exceeds threshold",
                            server, metrics.error_rate
                        ),
                        now,
                    )
                    .with_server(server.as_str())
                    .with_value(AlertValue::Number(metrics.error_rate)),
                );
            }
        }

        alerts
    }
}

/// Bounded alert history, oldest evicted first
#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    capacity: usize,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, alert: Alert) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(alert);
    }

    pub fn extend<I: IntoIterator<Item = Alert>>(&mut self, alerts: I) {
        for alert in alerts {
            self.push(alert);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.entries.iter()
    }

    /// Alerts raised within `window` before `now`
    pub fn recent(&self, now: DateTime<Utc>, window: Duration) -> impl Iterator<Item = &Alert> {
        let since = now - window;
        self.entries.iter().filter(move |alert| alert.timestamp > since)
    }

    pub fn to_vec(&self) -> Vec<Alert> {
        self.entries.iter().cloned().collect()
    }
}

/// Delivery target for alerts
pub trait AlertNotifier: Send + Sync {
    fn notify(&self, alert: &Alert);
}

/// Notifier that only writes critical alerts to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl AlertNotifier for LogNotifier {
    fn notify(&self, alert: &Alert) {
        if alert.severity == Severity::Critical {
            error!(alert_id = %alert.id, alert_type = %alert.kind, "CRITICAL ALERT NOTIFICATION: {}", alert.message);
        } else {
            warn!(alert_id = %alert.id, alert_type = %alert.kind, severity = %alert.severity, "{}", alert.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{
        AgentMetrics, CpuMetrics, HealthStatus, McpServerMetrics, MemoryMetrics, ProcessMetrics,
        SystemMetrics,
    };
    use std::collections::BTreeMap;

    fn quiet_sample() -> MetricSample {
        MetricSample {
            timestamp: Utc::now(),
            system: SystemMetrics {
                cpu: CpuMetrics { load_average: 0.5, usage_percent: 5.0 },
                memory: MemoryMetrics {
                    total_mb: 1000,
                    used_mb: 500,
                    free_mb: 500,
                    usage_percent: 50.0,
                },
                process: ProcessMetrics {
                    heap_used_mb: 1,
                    heap_total_mb: 2,
                    rss_mb: 3,
                    cpu_user_ms: 4,
                    cpu_system_ms: 5,
                },
                uptime: 10,
                platform: "linux".to_string(),
                arch: "x86_64".to_string(),
            },
            agents: BTreeMap::new(),
            mcp_servers: BTreeMap::new(),
            workflows: BTreeMap::new(),
        }
    }

    fn agent(success_rate: f64, response_time_ms: f64) -> AgentMetrics {
        AgentMetrics {
            status: HealthStatus::Healthy,
            response_time_ms,
            success_rate,
            last_used: Utc::now(),
            coordination_score: 90.0,
            error_count: 0,
        }
    }

    fn server(status: HealthStatus, error_rate: f64) -> McpServerMetrics {
        McpServerMetrics {
            status,
            response_time_ms: 40.0,
            availability_percent: 99.0,
            throughput_qps: 20.0,
            error_rate,
            security_status: "secure".to_string(),
        }
    }

    #[test]
    fn test_alert_id_format() {
        let now = Utc::now();
        let id = generate_alert_id(now);
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "alert");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_quiet_sample_raises_nothing() {
        let evaluator = AlertEvaluator::new(AlertThresholds::default());
        assert!(evaluator.evaluate(&quiet_sample(), Utc::now()).is_empty());
    }

    #[test]
    fn test_system_thresholds() {
        let evaluator = AlertEvaluator::new(AlertThresholds::default());
        let mut sample = quiet_sample();
        sample.system.cpu.usage_percent = 80.0;
        sample.system.memory.usage_percent = 85.0;
        assert!(evaluator.evaluate(&sample, Utc::now()).is_empty());

        sample.system.cpu.usage_percent = 81.0;
        sample.system.memory.usage_percent = 86.0;
        let alerts = evaluator.evaluate(&sample, Utc::now());
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, AlertKind::CpuHigh);
        assert_eq!(alerts[1].kind, AlertKind::MemoryHigh);
        assert!(alerts.iter().all(|a| a.severity == Severity::High));
    }

    #[test]
    fn test_every_low_success_rate_raises_high_alert() {
        let evaluator = AlertEvaluator::new(AlertThresholds::default());
        let mut sample = quiet_sample();
        for (i, rate) in [94.9, 50.0, 0.0, 95.0, 100.0].iter().enumerate() {
            sample.agents.insert(format!("agent-{}", i), agent(*rate, 100.0));
        }

        let alerts = evaluator.evaluate(&sample, Utc::now());
        let low: Vec<_> = alerts
            .iter()
            .filter(|a| a.kind == AlertKind::AgentLowSuccessRate)
            .collect();

        assert_eq!(low.len(), 3);
        assert!(low.iter().all(|a| a.severity == Severity::High));
        assert!(low.iter().all(|a| a.agent.is_some()));
    }

    #[test]
    fn test_slow_agent_is_medium() {
        let evaluator = AlertEvaluator::new(AlertThresholds::default());
        let mut sample = quiet_sample();
        sample.agents.insert("bmad-dev".to_string(), agent(99.0, 5001.0));

        let alerts = evaluator.evaluate(&sample, Utc::now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::AgentSlowResponse);
        assert_eq!(alerts[0].severity, Severity::Medium);
        assert_eq!(alerts[0].agent.as_deref(), Some("bmad-dev"));
    }

    #[test]
    fn test_one_critical_alert_per_unhealthy_server() {
        let evaluator = AlertEvaluator::new(AlertThresholds::default());
        let mut sample = quiet_sample();
        sample.mcp_servers.insert("github".to_string(), server(HealthStatus::Unhealthy, 0.0));
        sample.mcp_servers.insert("redis".to_string(), server(HealthStatus::Degraded, 0.0));
        sample.mcp_servers.insert("memory".to_string(), server(HealthStatus::Healthy, 0.0));

        let alerts = evaluator.evaluate(&sample, Utc::now());
        let unhealthy: Vec<_> = alerts
            .iter()
            .filter(|a| a.kind == AlertKind::McpServerUnhealthy)
            .collect();

        assert_eq!(unhealthy.len(), 2);
        assert!(unhealthy.iter().all(|a| a.severity == Severity::Critical));
        let servers: Vec<_> = unhealthy.iter().filter_map(|a| a.server.as_deref()).collect();
        assert_eq!(servers, vec!["github", "redis"]);
        assert_eq!(unhealthy[0].value, Some(AlertValue::Text("unhealthy".to_string())));
    }

    #[test]
    fn test_high_error_rate() {
        let evaluator = AlertEvaluator::new(AlertThresholds::default());
        let mut sample = quiet_sample();
        sample.mcp_servers.insert("notion".to_string(), server(HealthStatus::Healthy, 7.5));

        let alerts = evaluator.evaluate(&sample, Utc::now());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::McpHighErrorRate);
        assert_eq!(alerts[0].value, Some(AlertValue::Number(7.5)));
    }

    #[test]
    fn test_alert_log_evicts_oldest() {
        let mut log = AlertLog::new(1000);
        let now = Utc::now();
        for i in 0..1005 {
            log.push(Alert::new(AlertKind::CpuHigh, Severity::High, format!("alert {}", i), now));
            assert!(log.len() <= 1000);
        }

        assert_eq!(log.len(), 1000);
        assert_eq!(log.iter().next().map(|a| a.message.as_str()), Some("alert 5"));
        assert_eq!(log.iter().last().map(|a| a.message.as_str()), Some("alert 1004"));
    }

    #[test]
    fn test_recent_window() {
        let mut log = AlertLog::new(10);
        let now = Utc::now();
        log.push(Alert::new(AlertKind::CpuHigh, Severity::High, "old", now - Duration::hours(25)));
        log.push(Alert::new(AlertKind::CpuHigh, Severity::High, "new", now - Duration::hours(1)));

        let recent: Vec<_> = log.recent(now, Duration::hours(24)).collect();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].message, "new");
    }

    #[test]
    fn test_alert_serialization_shape() {
        let alert = Alert::new(AlertKind::McpServerUnhealthy, Severity::Critical, "down", Utc::now())
            .with_server("github")
            .with_value(AlertValue::Text("unhealthy".to_string()));
        let value = serde_json::to_value(&alert).unwrap();

        assert_eq!(value["type"], "MCP_SERVER_UNHEALTHY");
        assert_eq!(value["severity"], "critical");
        assert_eq!(value["server"], "github");
        assert!(value.get("agent").is_none());
    }
}
