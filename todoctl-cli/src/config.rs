//! Configuration file handling and the `config` subcommand
//!
//! Layering, lowest to highest: built-in defaults, `~/.todoctl/config.toml`,
//! environment (including `.env`), command-line flags.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use todoctl_core::store::pool::DEFAULT_MAX_CONNECTIONS;
use todoctl_server::BackendKind;

/// Database used when nothing else names one
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/todos";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoctlConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<SocketAddr>,
    pub backend: Option<BackendKind>,
    pub cors_permissive: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

impl TodoctlConfig {
    /// Default location: ~/.todoctl/config.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".todoctl/config.toml")
    }

    /// Load from `path`, or defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).context("Failed to parse config file (invalid TOML)")
    }

    /// Config with every default written out, used by `config init`.
    pub fn template() -> Self {
        Self {
            server: ServerSection {
                bind: Some(todoctl_server::ServerConfig::default().bind_addr),
                backend: Some(BackendKind::default()),
                cors_permissive: Some(false),
            },
            database: DatabaseSection {
                url: Some(DEFAULT_DATABASE_URL.to_string()),
                max_connections: Some(DEFAULT_MAX_CONNECTIONS),
            },
        }
    }
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with every default spelled out
    Init(InitArgs),
    /// Print the config file contents as parsed
    List,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs, path: &Path) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args, path),
        ConfigCommands::List => run_list(path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn run_init(args: InitArgs, path: &Path) -> Result<()> {
    if path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            path
        ));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(&TodoctlConfig::template())
        .context("Failed to serialize config")?;
    fs::write(path, content).context(format!("Failed to write config file: {:?}", path))?;

    println!("Created config at: {:?}", path);
    Ok(())
}

fn run_list(path: &Path) -> Result<()> {
    let config = TodoctlConfig::load_from(path)?;
    let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    println!("{}", toml_str);
    Ok(())
}
