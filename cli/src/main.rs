use clap::{CommandFactory, Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpctl::commands::{self, CleanupArgs, ConfigureArgs, Context, ProjectArgs, ValidateArgs};
use mcpctl::error::{self, Result};
use mcpctl::output::{OutputFormat, OutputManager};
use mcpctl::utils;

#[derive(Parser)]
#[command(name = "mcpctl")]
#[command(about = "mcpctl - configure, validate and clean up MCP server integrations")]
#[command(version)]
#[command(long_about = "
mcpctl manages the MCP server registry of the host assistant: it merges the
recommended server set into the host configuration, writes project-scoped
servers, validates the whole setup and removes obsolete MCP files.

Examples:
  mcpctl configure                         # Merge the essential servers
  mcpctl project --match my-app            # Set servers for a project entry
  mcpctl validate --skip-connectivity      # Check config, env and files
  mcpctl cleanup --dry-run                 # List obsolete MCP files
")]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormatArg,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Host configuration file (skips the standard locations)
    #[arg(long, global = true, env = "MCPCTL_CONFIG_PATH")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormatArg {
    Table,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the essential MCP servers into the host configuration
    Configure(ConfigureArgs),

    /// Write project-scoped MCP servers for the current directory
    Project(ProjectArgs),

    /// Validate configuration, environment, project files and packages
    Validate(ValidateArgs),

    /// Remove obsolete MCP files and scripts
    Cleanup(CleanupArgs),

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli);

    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return;
    }

    if let Err(e) = run_command(cli).await {
        eprintln!("{}", error::format_error(&e));
        process::exit(e.exit_code());
    }
}

async fn run_command(cli: Cli) -> Result<()> {
    let colored = !cli.no_color && !cli.quiet && console::Term::stdout().features().colors_supported();
    let output = OutputManager::new(OutputFormat::from(cli.format), colored).quiet(cli.quiet);

    let ctx = Context {
        home: utils::home_dir()?,
        cwd: env::current_dir()?,
        config_path: cli.config_path,
    };
    debug!(home = %ctx.home.display(), cwd = %ctx.cwd.display(), "Resolved context");

    match cli.command {
        Commands::Configure(args) => commands::configure::run(args, &ctx, output).await,
        Commands::Project(args) => commands::project::run(args, &ctx, output).await,
        Commands::Validate(args) => commands::validate::run(args, &ctx, output).await,
        Commands::Cleanup(args) => commands::cleanup::run(args, output).await,
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

fn init_logging(cli: &Cli) {
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };

    // stdout carries command output, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mcpctl={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::{generate, Generator};
    use std::io;

    fn print_completions<G: Generator>(gen: G, cmd: &mut clap::Command) {
        generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    }

    let mut cmd = Cli::command();
    eprintln!("Generating completion file for {shell}...");
    print_completions(shell, &mut cmd);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert()
    }

    #[test]
    fn test_output_format_conversion() {
        assert_eq!(OutputFormat::from(OutputFormatArg::Table), OutputFormat::Table);
        assert_eq!(OutputFormat::from(OutputFormatArg::Json), OutputFormat::Json);
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["mcpctl", "configure", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::Configure(ConfigureArgs { dry_run: true })));

        let cli = Cli::try_parse_from(["mcpctl", "--format", "json", "validate", "--skip-connectivity"])
            .unwrap();
        assert!(matches!(cli.format, OutputFormatArg::Json));
        match cli.command {
            Commands::Validate(args) => {
                assert!(args.skip_connectivity);
                assert_eq!(args.timeout, 10);
            }
            _ => panic!("expected validate"),
        }

        let cli = Cli::try_parse_from(["mcpctl", "project", "--match", "template"]).unwrap();
        match cli.command {
            Commands::Project(args) => assert_eq!(args.pattern.as_deref(), Some("template")),
            _ => panic!("expected project"),
        }
    }
}
