//! Health check capability
//!
//! The sampler never produces values itself; it asks a [`HealthChecker`].
//! [`SimulatedHealthChecker`] is the only implementation shipped with the
//! monitor and produces randomized placeholder values after a short randomized
//! delay. Tests substitute deterministic checkers.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;

use crate::metrics::{
    AgentMetrics, CpuMetrics, HealthStatus, McpServerMetrics, MemoryMetrics, ProcessMetrics,
    SystemMetrics, WorkflowMetrics,
};

/// Source of per-entity metric values
#[allow(async_fn_in_trait)]
pub trait HealthChecker {
    /// Host level gauges
    async fn check_system(&self) -> SystemMetrics;

    /// Gauges for a single agent
    async fn check_agent(&self, agent: &str) -> AgentMetrics;

    /// Gauges for a single MCP server
    async fn check_mcp_server(&self, server: &str) -> McpServerMetrics;

    /// Gauges for a single workflow
    async fn check_workflow(&self, workflow: &str) -> WorkflowMetrics;
}

/// Randomized placeholder health checks
#[derive(Debug, Clone)]
pub struct SimulatedHealthChecker {
    /// Multiplier applied to the simulated check delays (0.0 disables them)
    delay_scale: f64,
}

impl Default for SimulatedHealthChecker {
    fn default() -> Self {
        Self { delay_scale: 1.0 }
    }
}

impl SimulatedHealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checker that answers immediately
    pub fn without_delays() -> Self {
        Self { delay_scale: 0.0 }
    }

    fn delay(&self, max_ms: f64) -> Duration {
        let ms = rand::thread_rng().gen::<f64>() * max_ms * self.delay_scale;
        Duration::from_micros((ms * 1000.0) as u64)
    }

    async fn pause(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl HealthChecker for SimulatedHealthChecker {
    async fn check_system(&self) -> SystemMetrics {
        let (cpu, memory, process) = {
            let mut rng = rand::thread_rng();

            let load_average = (rng.gen::<f64>() * 400.0).round() / 100.0;
            let cpu = CpuMetrics {
                load_average,
                usage_percent: (load_average * 10.0).round().min(100.0),
            };

            let total_mb: u64 = 16_384;
            let usage_percent = (40.0 + rng.gen::<f64>() * 40.0).round();
            let used_mb = (total_mb as f64 * usage_percent / 100.0).round() as u64;
            let memory = MemoryMetrics {
                total_mb,
                used_mb,
                free_mb: total_mb - used_mb,
                usage_percent,
            };

            let heap_total_mb = rng.gen_range(32..128);
            let process = ProcessMetrics {
                heap_used_mb: rng.gen_range(8..=heap_total_mb),
                heap_total_mb,
                rss_mb: heap_total_mb + rng.gen_range(16..64),
                cpu_user_ms: rng.gen_range(100..5_000),
                cpu_system_ms: rng.gen_range(10..500),
            };

            (cpu, memory, process)
        };

        SystemMetrics {
            cpu,
            memory,
            process,
            uptime: sysinfo::System::uptime(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }

    async fn check_agent(&self, _agent: &str) -> AgentMetrics {
        let delay = self.delay(100.0);
        let metrics = {
            let mut rng = rand::thread_rng();
            let idle_ms = (rng.gen::<f64>() * 3_600_000.0) as i64;
            AgentMetrics {
                status: if rng.gen::<f64>() > 0.1 {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Degraded
                },
                response_time_ms: (50.0 + rng.gen::<f64>() * 200.0).round(),
                success_rate: (95.0 + rng.gen::<f64>() * 5.0).round(),
                last_used: Utc::now() - chrono::Duration::milliseconds(idle_ms),
                coordination_score: (85.0 + rng.gen::<f64>() * 15.0).round(),
                error_count: rng.gen_range(0..3),
            }
        };

        Self::pause(delay).await;
        metrics
    }

    async fn check_mcp_server(&self, _server: &str) -> McpServerMetrics {
        let delay = self.delay(50.0);
        let metrics = {
            let mut rng = rand::thread_rng();
            McpServerMetrics {
                status: if rng.gen::<f64>() > 0.05 {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Unhealthy
                },
                response_time_ms: (30.0 + rng.gen::<f64>() * 150.0).round(),
                availability_percent: (99.0 + rng.gen::<f64>()).round(),
                throughput_qps: (10.0 + rng.gen::<f64>() * 40.0).round(),
                error_rate: (rng.gen::<f64>() * 2.0).round(),
                security_status: "secure".to_string(),
            }
        };

        Self::pause(delay).await;
        metrics
    }

    async fn check_workflow(&self, _workflow: &str) -> WorkflowMetrics {
        let delay = self.delay(30.0);
        let metrics = {
            let mut rng = rand::thread_rng();
            WorkflowMetrics {
                executions_last_hour: rng.gen_range(0..20),
                avg_duration_ms: (1000.0 + rng.gen::<f64>() * 3000.0).round(),
                success_rate: (96.0 + rng.gen::<f64>() * 4.0).round(),
                parallel_efficiency: (75.0 + rng.gen::<f64>() * 20.0).round(),
                resource_utilization: (60.0 + rng.gen::<f64>() * 30.0).round(),
            }
        };

        Self::pause(delay).await;
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_agent_values_stay_in_range() {
        let checker = SimulatedHealthChecker::without_delays();
        for _ in 0..200 {
            let agent = checker.check_agent("bmad-dev").await;
            assert!((50.0..=250.0).contains(&agent.response_time_ms));
            assert!((95.0..=100.0).contains(&agent.success_rate));
            assert!((85.0..=100.0).contains(&agent.coordination_score));
            assert!(agent.error_count <= 2);
            assert!(agent.last_used <= Utc::now());
        }
    }

    #[tokio::test]
    async fn test_mcp_server_values_stay_in_range() {
        let checker = SimulatedHealthChecker::without_delays();
        for _ in 0..200 {
            let server = checker.check_mcp_server("github").await;
            assert!((30.0..=180.0).contains(&server.response_time_ms));
            assert!((99.0..=100.0).contains(&server.availability_percent));
            assert!((10.0..=50.0).contains(&server.throughput_qps));
            assert!((0.0..=2.0).contains(&server.error_rate));
            assert_eq!(server.security_status, "secure");
        }
    }

    #[tokio::test]
    async fn test_workflow_values_stay_in_range() {
        let checker = SimulatedHealthChecker::without_delays();
        for _ in 0..200 {
            let workflow = checker.check_workflow("qa-gate").await;
            assert!(workflow.executions_last_hour < 20);
            assert!((1000.0..=4000.0).contains(&workflow.avg_duration_ms));
            assert!((96.0..=100.0).contains(&workflow.success_rate));
            assert!((75.0..=95.0).contains(&workflow.parallel_efficiency));
            assert!((60.0..=90.0).contains(&workflow.resource_utilization));
        }
    }

    #[tokio::test]
    async fn test_system_memory_is_consistent() {
        let checker = SimulatedHealthChecker::without_delays();
        let system = checker.check_system().await;
        assert_eq!(system.memory.used_mb + system.memory.free_mb, system.memory.total_mb);
        assert!(system.cpu.usage_percent <= 100.0);
        assert!(system.process.heap_used_mb <= system.process.heap_total_mb);
        assert!(!system.platform.is_empty());
    }
}
