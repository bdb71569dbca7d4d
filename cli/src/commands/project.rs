use crate::catalog::project_servers;
use crate::commands::Context;
use crate::env_check::process_env;
use crate::error::{McpctlError, Result};
use crate::host_config::{self, HostConfig};
use crate::output::OutputManager;
use clap::Args;
use serde::Serialize;
use tracing::info;

#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Reuse an existing project entry whose key contains this text (case-insensitive)
    #[arg(long = "match", value_name = "TEXT")]
    pub pattern: Option<String>,

    /// Print the resulting configuration without writing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct ProjectSummary {
    config_path: String,
    project: String,
    created: bool,
    servers: Vec<String>,
}

pub async fn run(args: ProjectArgs, ctx: &Context, output: OutputManager) -> Result<()> {
    let path = ctx
        .config_path
        .clone()
        .unwrap_or_else(|| host_config::default_path(&ctx.home));
    if !path.exists() {
        return Err(McpctlError::ConfigNotFound { path: path.display().to_string() });
    }

    let mut config = HostConfig::load(&path)?;
    let cwd = ctx.cwd.display().to_string();
    let key = config
        .find_project_key(&cwd, args.pattern.as_deref())
        .unwrap_or_else(|| cwd.clone());

    let servers = project_servers(&ctx.cwd, process_env);
    let created = config.set_project_servers(&key, &servers)?;
    let names: Vec<String> = servers.into_iter().map(|(name, _)| name).collect();
    info!(project = %key, created, "Project servers set");

    if args.dry_run {
        println!("{}", config.to_pretty_json()?);
        return Ok(());
    }

    config.save()?;

    if output.is_json() {
        return output.print_json(&ProjectSummary {
            config_path: path.display().to_string(),
            project: key,
            created,
            servers: names,
        });
    }

    output.print_success("Project MCP configuration added")?;
    output.print_key_value("Project", &key)?;
    output.print_key_value("Servers", &names.join(", "))?;
    if created {
        output.print_info("Created a new project entry")?;
    }
    output.print_info("Restart the assistant to apply the changes, then run /mcp to check the servers")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn quiet() -> OutputManager {
        OutputManager::new(OutputFormat::Table, false).quiet(true)
    }

    #[tokio::test]
    async fn test_requires_existing_config() {
        let temp = TempDir::new().unwrap();
        let ctx = Context {
            home: temp.path().to_path_buf(),
            cwd: temp.path().to_path_buf(),
            config_path: None,
        };

        let result = run(ProjectArgs { pattern: None, dry_run: false }, &ctx, quiet()).await;
        assert!(matches!(result, Err(McpctlError::ConfigNotFound { .. })));
    }

    #[tokio::test]
    async fn test_reuses_matching_project_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".claude.json");
        fs::write(
            &path,
            r#"{"userID":"abc","projectConfigs":{"/Users/me/BMoreMAD-Template":{"allowedTools":["Bash"],"mcpServers":{}}}}"#,
        )
        .unwrap();

        let ctx = Context {
            home: temp.path().to_path_buf(),
            cwd: temp.path().join("elsewhere"),
            config_path: None,
        };
        let args = ProjectArgs { pattern: Some("bmoremad-template".to_string()), dry_run: false };
        run(args, &ctx, quiet()).await.unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let projects = written["projectConfigs"].as_object().unwrap();
        assert_eq!(projects.len(), 1);

        let project = &projects["/Users/me/BMoreMAD-Template"];
        assert_eq!(project["allowedTools"][0], "Bash");
        assert_eq!(project["mcpServers"]["github"]["type"], "stdio");
        assert_eq!(written["userID"], "abc");
        assert!(temp.path().join(".claude.json.backup").exists());
    }

    #[tokio::test]
    async fn test_creates_entry_for_cwd() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("host.json");
        fs::write(&path, "{}").unwrap();

        let cwd = temp.path().join("app");
        let ctx = Context {
            home: temp.path().to_path_buf(),
            cwd: cwd.clone(),
            config_path: Some(path.clone()),
        };
        run(ProjectArgs { pattern: None, dry_run: false }, &ctx, quiet()).await.unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let project = &written["projectConfigs"][cwd.display().to_string().as_str()];
        assert_eq!(project["hasTrustDialogAccepted"], false);
        assert_eq!(project["mcpServers"].as_object().unwrap().len(), 5);
    }
}
