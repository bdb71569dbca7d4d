//! MCP toolkit benchmark suite
//!
//! Simulated workloads measuring how multi-agent coordination and MCP server
//! calls behave:
//!
//! - Agent coordination at increasing agent counts
//! - MCP server response times
//! - Workflow parsing at increasing complexity
//! - Sequential versus parallel agent execution
//! - Resource usage of the running process
//!
//! The results are graded and written as a JSON report.

pub mod simulation;
pub mod suite;
pub mod summary;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub use simulation::{Complexity, Simulator};
pub use suite::{
    CoordinationResult, McpServerResult, ParallelComparison, ParsingResult, ResourceUsage,
};
pub use summary::{Grade, KeyMetrics, Summary};

/// Largest accepted delay multiplier
pub const MAX_TIME_SCALE: f64 = 1000.0;

/// Default report location, relative to the working directory
pub const DEFAULT_REPORT_PATH: &str = "logs/performance-benchmarks.json";

/// Pass/fail thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTargets {
    /// Parallel execution must be at least this many times faster
    pub parallel_speedup: f64,
    /// Resident memory ceiling in MB
    pub max_memory_mb: u64,
}

impl Default for PerformanceTargets {
    fn default() -> Self {
        Self {
            parallel_speedup: 3.0,
            max_memory_mb: 512,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Multiplier applied to every simulated delay
    pub time_scale: f64,
    pub targets: PerformanceTargets,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            targets: PerformanceTargets::default(),
        }
    }
}

impl BenchmarkConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.time_scale > 0.0 && self.time_scale.is_finite()) {
            bail!("time scale must be a positive number, got {}", self.time_scale);
        }
        if self.time_scale > MAX_TIME_SCALE {
            bail!("time scale must not exceed {}, got {}", MAX_TIME_SCALE, self.time_scale);
        }
        if self.targets.parallel_speedup <= 0.0 {
            bail!("parallel speedup target must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Benchmarks {
    pub agent_coordination: BTreeMap<String, CoordinationResult>,
    pub mcp_servers: BTreeMap<String, McpServerResult>,
    pub workflow_parsing: BTreeMap<String, ParsingResult>,
    pub parallel_comparison: ParallelComparison,
    pub resource_usage: ResourceUsage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub ecosystem: String,
    pub environment: String,
    pub time_scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub timestamp: DateTime<Utc>,
    pub benchmarks: Benchmarks,
    pub summary: Summary,
    pub metadata: Metadata,
}

impl BenchmarkReport {
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Benchmark report written");
        Ok(())
    }
}

/// Run every benchmark in order and summarise the results
pub async fn run_all_benchmarks(config: &BenchmarkConfig) -> Result<BenchmarkReport> {
    config.validate()?;
    let sim = Simulator::new(config.time_scale);

    info!("Benchmarking agent coordination");
    let agent_coordination = suite::agent_coordination(&sim).await;

    info!("Benchmarking MCP server response times");
    let mcp_servers = suite::mcp_servers(&sim).await;

    info!("Benchmarking workflow parsing");
    let workflow_parsing = suite::workflow_parsing(&sim).await;

    info!("Benchmarking parallel versus sequential execution");
    let parallel_comparison = suite::parallel_comparison(&sim, config.targets.parallel_speedup).await;

    let resource_usage = suite::resource_usage(config.targets.max_memory_mb);

    let benchmarks = Benchmarks {
        agent_coordination,
        mcp_servers,
        workflow_parsing,
        parallel_comparison,
        resource_usage,
    };
    let summary = summarize(&benchmarks, &config.targets);

    Ok(BenchmarkReport {
        timestamp: Utc::now(),
        benchmarks,
        summary,
        metadata: Metadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            ecosystem: "MCP".to_string(),
            environment: std::env::consts::OS.to_string(),
            time_scale: config.time_scale,
        },
    })
}

pub fn summarize(benchmarks: &Benchmarks, targets: &PerformanceTargets) -> Summary {
    let speedup = benchmarks.parallel_comparison.speedup_factor;
    let servers = &benchmarks.mcp_servers;
    let avg_mcp = if servers.is_empty() {
        0
    } else {
        let total: u64 = servers.values().map(|r| r.response_time_ms).sum();
        (total as f64 / servers.len() as f64).round() as u64
    };
    let max_agents = benchmarks
        .agent_coordination
        .values()
        .map(|r| r.agents)
        .max()
        .unwrap_or(0);

    Summary {
        overall_grade: summary::overall_grade(
            speedup,
            avg_mcp,
            benchmarks.resource_usage.memory_efficient(),
        ),
        key_metrics: KeyMetrics {
            parallel_speedup: format!("{}x faster", speedup),
            max_agents_coordinated: max_agents,
            avg_mcp_response_time: avg_mcp,
            performance_threshold_met: benchmarks.parallel_comparison.threshold_met,
        },
        recommendations: summary::recommendations(speedup, targets.parallel_speedup, avg_mcp),
    }
}

/// `DEFAULT_REPORT_PATH` resolved against `base`
pub fn default_report_path(base: &Path) -> PathBuf {
    base.join(DEFAULT_REPORT_PATH)
}
