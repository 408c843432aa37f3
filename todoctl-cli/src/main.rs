//! todoctl CLI - to-do list server
//!
//! - `serve`: run the JSON HTTP API on the in-memory or PostgreSQL backend
//! - `config`: inspect or create `~/.todoctl/config.toml`
//! - `completions`: shell completion scripts

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;
mod config;
mod tracing_setup;

use config::TodoctlConfig;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "todoctl",
    author,
    version,
    about = "To-do list manager served over HTTP",
    long_about = "Create lists, add and complete todos, and rename or delete lists through a \
                  small JSON API backed by per-session memory or PostgreSQL."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.todoctl/config.toml)
    #[arg(long, global = true, env = "TODOCTL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::ServeArgs),
    /// Manage todoctl configuration (init, list, path)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

fn load_dotenv() {
    dotenvy::dotenv().ok();
    if let Some(home) = dirs::home_dir() {
        dotenvy::from_path(home.join(".todoctl/.env")).ok();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    let config_path = cli.config.unwrap_or_else(TodoctlConfig::default_path);

    match cli.command {
        Commands::Serve(args) => {
            let file = TodoctlConfig::load_from(&config_path)?;
            commands::run_serve(args, file).await
        }
        Commands::Config(args) => config::run_config(args, &config_path),
        Commands::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "todoctl", &mut std::io::stdout());
            Ok(())
        }
    }
}
