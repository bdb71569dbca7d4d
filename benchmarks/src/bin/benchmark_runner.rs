//! MCP Benchmark Runner
//!
//! Runs the simulated benchmark suite, prints a summary and writes the JSON report.

use anyhow::Result;
use clap::Parser;
use mcp_benchmarks::{
    run_all_benchmarks, BenchmarkConfig, BenchmarkReport, PerformanceTargets, DEFAULT_REPORT_PATH,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "benchmark-runner")]
#[command(about = "MCP Performance Benchmark Runner")]
#[command(version)]
struct Cli {
    /// Multiplier applied to every simulated delay
    #[arg(long, default_value = "1.0")]
    time_scale: f64,

    /// Required parallel speedup
    #[arg(long, default_value = "3.0")]
    speedup_target: f64,

    /// Report file
    #[arg(short, long, default_value = DEFAULT_REPORT_PATH)]
    output: PathBuf,

    /// Print the full report as JSON instead of the summary
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = BenchmarkConfig {
        time_scale: cli.time_scale,
        targets: PerformanceTargets {
            parallel_speedup: cli.speedup_target,
            ..PerformanceTargets::default()
        },
    };

    let start_time = std::time::Instant::now();
    let report = run_all_benchmarks(&config).await?;
    info!("Completed benchmark suite in {:.2?}", start_time.elapsed());

    report.write_to(&cli.output)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, &cli.output);
    }

    Ok(())
}

fn print_summary(report: &BenchmarkReport, path: &std::path::Path) {
    let summary = &report.summary;
    let key = &summary.key_metrics;

    println!("PERFORMANCE BENCHMARK SUMMARY");
    println!("=============================");
    println!("Overall Grade: {}", summary.overall_grade);
    println!("Parallel Speedup: {}", key.parallel_speedup);
    println!("Max Agents: {}", key.max_agents_coordinated);
    println!("Avg MCP Response: {}ms", key.avg_mcp_response_time);
    println!(
        "Threshold Met: {}",
        if key.performance_threshold_met { "YES" } else { "NO" }
    );

    println!("\nRecommendations:");
    for rec in &summary.recommendations {
        println!("  - {}", rec);
    }
    println!("\nDetailed report saved: {}", path.display());
}
