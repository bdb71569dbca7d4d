use crate::catalog::{CONNECTIVITY_PACKAGES, RECOMMENDED_SERVERS};
use crate::commands::Context;
use crate::commands::configure::display_environment;
use crate::env_check::{check_env, process_env, required_satisfied, EnvVarStatus};
use crate::error::{McpctlError, Result};
use crate::host_config::{self, EntryIssue, HostConfig};
use crate::output::OutputManager;
use clap::Args;
use futures::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, warn};

/// Project files expected in the working directory
pub const DEFAULT_PROJECT_FILES: [&str; 4] = [
    ".env.example",
    "MCP-MODERN-SETUP.md",
    "scripts/configure-mcp-modern.js",
    "scripts/cleanup-mcp.js",
];

const CHECK_COUNT: usize = 4;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Skip the package connectivity check (counted as passed)
    #[arg(long)]
    pub skip_connectivity: bool,

    /// Timeout per package probe in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Project file that must exist (repeatable, replaces the default list)
    #[arg(long = "require-file", value_name = "PATH")]
    pub required_files: Vec<PathBuf>,
}

/// Checks whether an npm package can be fetched and started
#[allow(async_fn_in_trait)]
pub trait PackageProbe {
    async fn probe(&self, package: &str, timeout: Duration) -> std::result::Result<(), String>;
}

/// Runs `npx -y <package> --help`
pub struct NpxProbe {
    program: &'static str,
}

impl Default for NpxProbe {
    fn default() -> Self {
        Self {
            program: if cfg!(windows) { "npx.cmd" } else { "npx" },
        }
    }
}

impl PackageProbe for NpxProbe {
    async fn probe(&self, package: &str, timeout: Duration) -> std::result::Result<(), String> {
        let mut command = tokio::process::Command::new(self.program);
        command
            .args(["-y", package, "--help"])
            .stdin(Stdio::null())
            .kill_on_drop(true);

        match tokio::time::timeout(timeout, command.output()).await {
            Err(_) => Err(format!("timed out after {}s", timeout.as_secs())),
            Ok(Err(e)) => Err(e.to_string()),
            Ok(Ok(out)) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                if out.status.success() && !stderr.contains("Error") {
                    Ok(())
                } else {
                    Err(format!("exited with {}", out.status))
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigCheck {
    pub passed: bool,
    pub path: Option<String>,
    pub servers: Vec<String>,
    pub missing_recommended: Vec<String>,
    pub issues: Vec<EntryIssue>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnvironmentCheck {
    pub passed: bool,
    pub variables: Vec<EnvVarStatus>,
}

#[derive(Debug, Serialize)]
pub struct FilesCheck {
    pub passed: bool,
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProbeResult {
    pub server: String,
    pub package: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectivityCheck {
    pub passed: bool,
    pub skipped: bool,
    pub reachable: usize,
    pub total: usize,
    pub results: Vec<ProbeResult>,
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub config: ConfigCheck,
    pub environment: EnvironmentCheck,
    pub project_files: FilesCheck,
    pub connectivity: ConnectivityCheck,
    pub score: usize,
    pub total: usize,
}

impl ValidationReport {
    pub fn is_complete(&self) -> bool {
        self.score == self.total
    }
}

pub async fn run(args: ValidateArgs, ctx: &Context, output: OutputManager) -> Result<()> {
    let spinner = output.create_spinner("Validating MCP setup...");
    let report = validate_with(&args, ctx, &NpxProbe::default(), process_env).await;
    spinner.finish_and_clear();

    if output.is_json() {
        output.print_json(&report)?;
    } else {
        display_report(&report, &output)?;
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(McpctlError::Validation { score: report.score, total: report.total })
    }
}

/// Run all four checks with the given probe and environment
pub async fn validate_with<P, F>(
    args: &ValidateArgs,
    ctx: &Context,
    probe: &P,
    lookup: F,
) -> ValidationReport
where
    P: PackageProbe,
    F: Fn(&str) -> Option<String>,
{
    let config = check_config(&ctx.home, ctx.explicit_config());

    let variables = check_env(lookup);
    let environment = EnvironmentCheck { passed: required_satisfied(&variables), variables };

    let files: Vec<PathBuf> = if args.required_files.is_empty() {
        DEFAULT_PROJECT_FILES.iter().map(PathBuf::from).collect()
    } else {
        args.required_files.clone()
    };
    let project_files = check_project_files(&ctx.cwd, &files);

    let connectivity = if args.skip_connectivity {
        ConnectivityCheck { passed: true, skipped: true, reachable: 0, total: 0, results: Vec::new() }
    } else {
        check_connectivity(probe, Duration::from_secs(args.timeout)).await
    };

    let score = [config.passed, environment.passed, project_files.passed, connectivity.passed]
        .iter()
        .filter(|passed| **passed)
        .count();

    ValidationReport { config, environment, project_files, connectivity, score, total: CHECK_COUNT }
}

/// Find, parse and structurally check the host config
pub fn check_config(home: &Path, explicit: Option<&Path>) -> ConfigCheck {
    let candidates = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => host_config::candidate_paths(home),
    };

    let mut failed = ConfigCheck {
        passed: false,
        path: None,
        servers: Vec::new(),
        missing_recommended: Vec::new(),
        issues: Vec::new(),
        error: Some("no configuration file found".to_string()),
    };

    for path in candidates.iter().filter(|p| p.exists()) {
        let config = match HostConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable host config");
                failed.path = Some(path.display().to_string());
                failed.error = Some(e.to_string());
                continue;
            }
        };

        let mut check = ConfigCheck {
            passed: false,
            path: Some(path.display().to_string()),
            servers: config.server_names(),
            missing_recommended: Vec::new(),
            issues: Vec::new(),
            error: None,
        };

        if config.mcp_servers().is_none() {
            check.error = Some("missing mcpServers section".to_string());
            return check;
        }

        check.missing_recommended = RECOMMENDED_SERVERS
            .iter()
            .filter(|name| !check.servers.iter().any(|s| s == *name))
            .map(|name| name.to_string())
            .collect();
        check.issues = config.entry_issues();
        check.passed = check.issues.is_empty();
        return check;
    }

    failed
}

pub fn check_project_files(root: &Path, files: &[PathBuf]) -> FilesCheck {
    let (present, missing): (Vec<_>, Vec<_>) = files
        .iter()
        .map(|f| (f.display().to_string(), root.join(f).exists()))
        .partition(|(_, exists)| *exists);

    FilesCheck {
        passed: missing.is_empty(),
        present: present.into_iter().map(|(f, _)| f).collect(),
        missing: missing.into_iter().map(|(f, _)| f).collect(),
    }
}

/// Probe every connectivity package concurrently
pub async fn check_connectivity<P: PackageProbe>(probe: &P, timeout: Duration) -> ConnectivityCheck {
    let results = join_all(CONNECTIVITY_PACKAGES.iter().map(|(server, package)| async move {
        let outcome = probe.probe(package, timeout).await;
        debug!(server, ok = outcome.is_ok(), "Package probe finished");
        ProbeResult {
            server: server.to_string(),
            package: package.to_string(),
            reachable: outcome.is_ok(),
            detail: outcome.err(),
        }
    }))
    .await;

    let reachable = results.iter().filter(|r| r.reachable).count();
    ConnectivityCheck {
        passed: reachable == results.len(),
        skipped: false,
        reachable,
        total: results.len(),
        results,
    }
}

fn display_report(report: &ValidationReport, output: &OutputManager) -> Result<()> {
    output.print_header("MCP configuration")?;
    let config = &report.config;
    if let Some(path) = &config.path {
        output.print_key_value("Configuration", path)?;
    }
    if let Some(error) = &config.error {
        output.print_failure(&format!("Configuration invalid: {}", error))?;
    } else {
        output.print_info(&format!("{} servers configured", config.servers.len()))?;
        for name in RECOMMENDED_SERVERS {
            if config.missing_recommended.iter().any(|m| m == name) {
                output.print_warning(&format!("{}: not configured (recommended)", name))?;
            } else {
                output.print_success(&format!("{}: configured", name))?;
            }
        }
        for issue in &config.issues {
            output.print_failure(&format!("{}: {}", issue.server, issue.problem))?;
        }
    }

    display_environment(&report.environment.variables, output)?;

    output.print_header("Project files")?;
    for file in &report.project_files.present {
        output.print_success(&format!("{}: present", file))?;
    }
    for file in &report.project_files.missing {
        output.print_failure(&format!("{}: missing", file))?;
    }

    output.print_header("Package connectivity")?;
    let connectivity = &report.connectivity;
    if connectivity.skipped {
        output.print_info("Skipped")?;
    } else {
        for result in &connectivity.results {
            if result.reachable {
                output.print_success(&format!("{}: package accessible", result.server))?;
            } else {
                output.print_failure(&format!(
                    "{}: not accessible ({})",
                    result.server,
                    result.detail.as_deref().unwrap_or("unknown error")
                ))?;
            }
        }
        output.print_info(&format!(
            "{}/{} packages accessible",
            connectivity.reachable, connectivity.total
        ))?;
    }

    output.print_header("Validation report")?;
    let line = |passed: bool, label: &str| -> Result<()> {
        if passed {
            output.print_success(label)
        } else {
            output.print_failure(label)
        }
    };
    line(report.config.passed, "MCP configuration")?;
    line(report.environment.passed, "Environment variables")?;
    line(report.project_files.passed, "Project files")?;
    line(report.connectivity.passed, "Package connectivity")?;
    output.print_key_value("Score", &format!("{}/{}", report.score, report.total))?;

    if report.is_complete() {
        output.print_success("MCP setup is fully operational")?;
        return Ok(());
    }

    output.print_header("Recommended actions")?;
    if !report.config.passed {
        output.print_list_item("Run: mcpctl configure")?;
    }
    if !report.environment.passed {
        output.print_list_item("Set your tokens in .env")?;
    }
    if !report.project_files.passed {
        output.print_list_item("Restore the missing files from the repository")?;
    }
    if !report.connectivity.passed {
        output.print_list_item("Check your internet connection and npx")?;
    }
    Ok(())
}
