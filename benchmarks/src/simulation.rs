//! Simulated workloads
//!
//! Every workload is a fixed nominal delay. The [`Simulator`] scales those
//! delays so the whole suite can run in a fraction of the nominal time.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
    Enterprise,
}

impl Complexity {
    /// Base delay of one coordination round
    pub fn coordination_base_ms(self) -> u64 {
        match self {
            Complexity::Low => 50,
            Complexity::Medium => 100,
            Complexity::High | Complexity::Enterprise => 200,
        }
    }

    pub fn parse_ms(self) -> u64 {
        match self {
            Complexity::Low => 20,
            Complexity::Medium => 50,
            Complexity::High => 120,
            Complexity::Enterprise => 200,
        }
    }
}

/// Nominal response time per MCP server
pub const MCP_SERVER_DELAYS: [(&str, u64); 8] = [
    ("github", 150),
    ("firecrawl", 180),
    ("postgresql", 80),
    ("redis", 25),
    ("notion", 200),
    ("shadcn", 100),
    ("filesystem", 50),
    ("memory", 30),
];

/// Agents run by the sequential/parallel comparison
pub const COMPARISON_AGENTS: usize = 6;

/// Nominal duration of one agent in the comparison
pub const AGENT_TASK_MS: u64 = 800;

const PER_AGENT_COORDINATION_MS: u64 = 20;

#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    time_scale: f64,
}

impl Simulator {
    pub fn new(time_scale: f64) -> Self {
        Self { time_scale }
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Saturates at `Duration::MAX` instead of overflowing
    pub fn scaled(&self, nominal_ms: u64) -> Duration {
        Duration::try_from_secs_f64(nominal_ms as f64 * self.time_scale / 1000.0)
            .unwrap_or(Duration::MAX)
    }

    async fn sleep(&self, nominal_ms: u64) {
        tokio::time::sleep(self.scaled(nominal_ms)).await;
    }

    pub async fn agent_coordination(&self, agents: u32, complexity: Complexity) {
        let delay = complexity.coordination_base_ms() + u64::from(agents) * PER_AGENT_COORDINATION_MS;
        self.sleep(delay).await;
    }

    pub async fn mcp_call(&self, delay_ms: u64) {
        self.sleep(delay_ms).await;
    }

    pub async fn workflow_parse(&self, complexity: Complexity) {
        self.sleep(complexity.parse_ms()).await;
    }

    pub async fn sequential_agents(&self) {
        for _ in 0..COMPARISON_AGENTS {
            self.sleep(AGENT_TASK_MS).await;
        }
    }

    pub async fn parallel_agents(&self) {
        join_all((0..COMPARISON_AGENTS).map(|_| self.sleep(AGENT_TASK_MS))).await;
    }
}
