use crate::catalog::essential_servers;
use crate::commands::Context;
use crate::env_check::{check_env, process_env, required_satisfied, EnvVarState, EnvVarStatus};
use crate::error::Result;
use crate::host_config::{self, HostConfig};
use crate::output::OutputManager;
use clap::Args;
use serde::Serialize;
use tracing::info;

#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Print the merged configuration without writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct ConfigureSummary<'a> {
    config_path: String,
    backup_path: Option<String>,
    servers: Vec<&'a str>,
    environment: &'a [EnvVarStatus],
    dry_run: bool,
}

pub async fn run(args: ConfigureArgs, ctx: &Context, output: OutputManager) -> Result<()> {
    let mut config = if args.dry_run {
        match host_config::locate(&ctx.home, ctx.explicit_config()) {
            Some(path) => HostConfig::load(&path)?,
            None => HostConfig::empty(
                ctx.config_path
                    .clone()
                    .unwrap_or_else(|| host_config::default_path(&ctx.home)),
            ),
        }
    } else {
        HostConfig::locate_or_create(&ctx.home, ctx.explicit_config())?
    };
    if !output.is_json() {
        output.print_key_value("Configuration", &config.path().display().to_string())?;
    }

    let servers = essential_servers(&ctx.cwd);
    config.merge_servers(&servers)?;
    let names: Vec<&str> = servers.iter().map(|(name, _)| name.as_str()).collect();
    info!(servers = ?names, "Merged essential servers");

    if args.dry_run {
        println!("{}", config.to_pretty_json()?);
        return Ok(());
    }

    let spinner = output.create_spinner("Writing configuration...");
    let backup = config.save()?;
    spinner.finish_and_clear();

    let environment = check_env(process_env);

    if output.is_json() {
        return output.print_json(&ConfigureSummary {
            config_path: config.path().display().to_string(),
            backup_path: backup.map(|p| p.display().to_string()),
            servers: names,
            environment: &environment,
            dry_run: false,
        });
    }

    if let Some(backup) = &backup {
        output.print_info(&format!("Backup created: {}", backup.display()))?;
    }
    output.print_success("MCP configuration updated")?;
    output.print_key_value("Servers", &names.join(", "))?;

    display_environment(&environment, &output)?;
    display_next_steps(&output)?;
    Ok(())
}

pub(crate) fn display_environment(statuses: &[EnvVarStatus], output: &OutputManager) -> Result<()> {
    output.print_header("Environment variables")?;

    for status in statuses {
        let kind = if status.required { "required" } else { "optional" };
        match (status.state, status.required) {
            (EnvVarState::Set, _) => output.print_success(&format!("{}: configured", status.name))?,
            (EnvVarState::Placeholder, true) => {
                output.print_failure(&format!("{}: placeholder value ({})", status.name, kind))?;
                output.print_hint(status.description)?;
            }
            (EnvVarState::Missing, true) => {
                output.print_failure(&format!("{}: not configured ({})", status.name, kind))?;
                output.print_hint(status.description)?;
            }
            (_, false) => output.print_warning(&format!("{}: not configured ({})", status.name, kind))?,
        }
    }

    if !required_satisfied(statuses) {
        output.print_warning("Set the required variables in your .env file (see .env.example)")?;
    }
    Ok(())
}

fn display_next_steps(output: &OutputManager) -> Result<()> {
    output.print_header("Next steps")?;
    output.print_list_item("1. Set your tokens in the .env file")?;
    output.print_list_item("2. Restart the assistant completely")?;
    output.print_list_item("3. Run /mcp to check the servers")?;
    output.print_list_item("4. Run 'mcpctl validate' to verify the setup")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> Context {
        Context {
            home: temp.path().to_path_buf(),
            cwd: temp.path().join("project"),
            config_path: None,
        }
    }

    #[tokio::test]
    async fn test_configure_creates_and_merges() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        let output = OutputManager::new(OutputFormat::Table, false).quiet(true);

        run(ConfigureArgs { dry_run: false }, &ctx, output).await.unwrap();

        let path = temp.path().join(".claude.json");
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let servers = written["mcpServers"].as_object().unwrap();
        assert_eq!(servers.len(), 5);
        assert!(servers.contains_key("brave-search"));
        // Created then rewritten, so the first write was backed up
        assert!(temp.path().join(".claude.json.backup").exists());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        let output = OutputManager::new(OutputFormat::Table, false).quiet(true);

        run(ConfigureArgs { dry_run: true }, &ctx, output).await.unwrap();

        assert!(!temp.path().join(".claude.json").exists());
    }
}
