//! HTTP server command
//!
//! Resolves settings from flags, environment and config file, opens the
//! chosen backend and runs the server until shutdown.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use todoctl_core::store::pool::DEFAULT_MAX_CONNECTIONS;
use todoctl_core::store::{create_pool_with_options, ensure_schema};
use todoctl_server::{run_server, Backend, BackendKind, ServerConfig};

use crate::config::{TodoctlConfig, DEFAULT_DATABASE_URL};

/// Arguments for the serve command
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:4567)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Storage backend: memory (per-session) or postgres
    #[arg(long, env = "TODOCTL_BACKEND")]
    pub backend: Option<BackendKind>,

    /// Database URL for the postgres backend
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

/// Fully resolved serve settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServeSettings {
    pub bind: SocketAddr,
    pub backend: BackendKind,
    pub database_url: String,
    pub max_connections: u32,
    pub cors_permissive: bool,
}

impl ServeSettings {
    /// Flags win over the config file, the config file over defaults.
    pub fn resolve(args: ServeArgs, file: TodoctlConfig) -> Self {
        let defaults = ServerConfig::default();
        Self {
            bind: args
                .bind
                .or(file.server.bind)
                .unwrap_or(defaults.bind_addr),
            backend: args.backend.or(file.server.backend).unwrap_or_default(),
            database_url: args
                .database_url
                .or(file.database.url)
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: args
                .max_connections
                .or(file.database.max_connections)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            cors_permissive: args.cors_permissive
                || file.server.cors_permissive.unwrap_or(defaults.cors_permissive),
        }
    }
}

async fn open_backend(settings: &ServeSettings) -> Result<Backend> {
    match settings.backend {
        BackendKind::Memory => Ok(Backend::memory()),
        BackendKind::Postgres => {
            let pool = create_pool_with_options(&settings.database_url, settings.max_connections)
                .await
                .context("Failed to create database pool")?;
            ensure_schema(&pool)
                .await
                .context("Failed to prepare database schema")?;
            Ok(Backend::Postgres(pool))
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, file: TodoctlConfig) -> Result<()> {
    let settings = ServeSettings::resolve(args, file);
    tracing::info!(
        bind = %settings.bind,
        backend = %settings.backend,
        "Starting todoctl server"
    );

    let backend = open_backend(&settings).await?;
    let config = ServerConfig {
        bind_addr: settings.bind,
        cors_permissive: settings.cors_permissive,
    };

    run_server(backend, config).await.context("Server error")?;
    Ok(())
}
