//! todoctl-server: JSON HTTP API over the todoctl storage backends
//!
//! Lists and todos are served from either per-session in-memory stores
//! (identified by cookie) or shared PostgreSQL tables.

pub mod http;
pub mod session;
pub mod state;

pub use http::{build_router, run_server, ApiError, ServerConfig, ServerError};
pub use state::{AppState, Backend, BackendKind};
