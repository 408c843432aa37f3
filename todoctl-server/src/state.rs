//! Application state shared across handlers

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::session::SessionRegistry;

/// Which storage backend the server runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Per-session in-memory lists
    #[default]
    Memory,
    /// Shared PostgreSQL tables
    Postgres,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Postgres => f.write_str("postgres"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "session" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(format!(
                "unknown backend '{}' (expected 'memory' or 'postgres')",
                other
            )),
        }
    }
}

/// Live storage backend
#[derive(Clone)]
pub enum Backend {
    Memory(SessionRegistry),
    Postgres(PgPool),
}

impl Backend {
    /// Fresh in-memory backend with no sessions.
    pub fn memory() -> Self {
        Self::Memory(SessionRegistry::default())
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Memory(_) => BackendKind::Memory,
            Self::Postgres(_) => BackendKind::Postgres,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            started_at: Utc::now(),
        }
    }
}
