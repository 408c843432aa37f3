//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Session middleware for the in-memory backend
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::session::{attach_session, SessionRegistry};
use crate::state::{AppState, Backend};

/// How often idle in-memory sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:4567)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4567)),
            cors_permissive: false,
        }
    }
}

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:4567"),
            HeaderValue::from_static("http://127.0.0.1:4567"),
        ])
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router for a backend.
pub fn build_router(backend: Backend, cors_permissive: bool) -> Router {
    let state = Arc::new(AppState::new(backend));

    let mut storage_routes = Router::new()
        .merge(routes::lists::router())
        .merge(routes::todos::router());

    if let Backend::Memory(_) = state.backend {
        storage_routes =
            storage_routes.layer(middleware::from_fn_with_state(state.clone(), attach_session));
    }

    Router::new()
        .merge(routes::health::router())
        .merge(storage_routes)
        .layer(cors_layer(cors_permissive))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until shutdown.
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::default();
/// run_server(Backend::memory(), config).await?;
/// ```
pub async fn run_server(backend: Backend, config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!(backend = %backend.kind(), "storage backend selected");
    if let Backend::Memory(registry) = &backend {
        tokio::spawn(sweep_sessions(registry.clone()));
    }
    let app = build_router(backend, config.cors_permissive);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Periodically drop idle sessions so abandoned stores are freed even when
/// no new sessions arrive.
async fn sweep_sessions(registry: SessionRegistry) {
    let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        ticker.tick().await;
        let dropped = registry.purge_expired().await;
        if dropped > 0 {
            tracing::debug!(dropped, "expired sessions swept");
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    /// Drives the router like a browser keeping one session cookie.
    struct Client {
        app: Router,
        cookie: Option<String>,
    }

    impl Client {
        fn new() -> Self {
            let _ = tracing_subscriber::fmt().with_test_writer().try_init();
            Self {
                app: build_router(Backend::memory(), false),
                cookie: None,
            }
        }

        async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> Response {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(cookie) = &self.cookie {
                builder = builder.header(COOKIE, cookie);
            }
            let request = match body {
                Some(json) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.app.clone().oneshot(request).await.unwrap();
            if let Some(set) = response.headers().get(SET_COOKIE) {
                let pair = set.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_owned());
            }
            response
        }

        async fn json(&mut self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let response = self.send(method, uri, body).await;
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 4567);
        assert!(!config.cors_permissive);
    }

    #[tokio::test]
    async fn health_endpoint() {
        let mut client = Client::new();
        let (status, body) = client.json("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["backend"], "memory");
    }

    #[tokio::test]
    async fn health_checks_start_no_sessions() {
        let registry = SessionRegistry::default();
        let app = build_router(Backend::Memory(registry.clone()), false);

        for _ in 0..500 {
            let request = Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get(SET_COOKIE).is_none());
        }
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn only_writes_register_a_session() {
        let registry = SessionRegistry::default();
        let mut client = Client {
            app: build_router(Backend::Memory(registry.clone()), false),
            cookie: None,
        };

        let (status, body) = client.json("GET", "/lists", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        assert!(client.cookie.is_none());
        assert_eq!(registry.len().await, 0);

        client
            .json("POST", "/lists", Some(json!({"list_name": "Kept"})))
            .await;
        assert!(client.cookie.is_some());
        assert_eq!(registry.len().await, 1);

        let (_, body) = client.json("GET", "/lists", None).await;
        assert_eq!(body[0]["name"], "Kept");
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn root_redirects_to_lists() {
        let mut client = Client::new();
        let response = client.send("GET", "/", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/lists");
    }

    #[tokio::test]
    async fn list_lifecycle() {
        let mut client = Client::new();

        let (status, body) = client
            .json("POST", "/lists", Some(json!({"list_name": "  Groceries  "})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "The list has been created.");
        assert_eq!(body["list"]["id"], 1);
        assert_eq!(body["list"]["name"], "Groceries");

        let (status, body) = client
            .json("POST", "/lists", Some(json!({"list_name": "groceries"})))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["messages"][0], "There is already a list by that name.");

        let (status, body) = client
            .json("POST", "/lists/1", Some(json!({"list_name": "GROCERIES"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "The list name has been updated.");
        assert_eq!(body["list"]["name"], "GROCERIES");

        let (status, body) = client.json("POST", "/lists/1/delete", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "The list has been deleted.");

        let (status, body) = client.json("GET", "/lists/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "The specified list was not found.");

        let (_, body) = client
            .json("POST", "/lists", Some(json!({"list_name": "Chores"})))
            .await;
        assert_eq!(body["list"]["id"], 1);
    }

    #[tokio::test]
    async fn todos_and_completion() {
        let mut client = Client::new();
        client
            .json("POST", "/lists", Some(json!({"list_name": "Trip"})))
            .await;
        client
            .json("POST", "/lists", Some(json!({"list_name": "Empty"})))
            .await;

        for name in ["tickets", "passport"] {
            let (status, body) = client
                .json("POST", "/lists/1/todos", Some(json!({"todo": name})))
                .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["message"], "The todo was added.");
        }

        let (status, _) = client
            .json("POST", "/lists/1/todos", Some(json!({"todo": ""})))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = client
            .json("POST", "/lists/1/todos/1", Some(json!({"completed": true})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["todo"]["completed"], true);

        let (_, body) = client.json("GET", "/lists/1", None).await;
        assert_eq!(body["ratio"], "1/2");
        assert_eq!(body["todos"][0]["name"], "passport");
        assert_eq!(body["complete"], false);

        let (status, body) = client.json("POST", "/lists/1/complete_all", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "All todos for list \"Trip\" were marked complete."
        );
        assert_eq!(body["list"]["complete"], true);

        // complete lists sort after incomplete ones
        let (_, body) = client.json("GET", "/lists", None).await;
        assert_eq!(body[0]["name"], "Empty");
        assert_eq!(body[1]["name"], "Trip");
        assert_eq!(body[1]["ratio"], "0/2");
    }

    #[tokio::test]
    async fn todo_delete_variants() {
        let mut client = Client::new();
        client
            .json("POST", "/lists", Some(json!({"list_name": "L"})))
            .await;
        client
            .json("POST", "/lists/1/todos", Some(json!({"todo": "a"})))
            .await;
        client
            .json("POST", "/lists/1/todos", Some(json!({"todo": "b"})))
            .await;

        let (status, body) = client.json("POST", "/lists/1/todos/1/delete", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "The todo has been deleted.");

        let cookie = client.cookie.clone().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/lists/1/todos/2/delete")
            .header(COOKIE, cookie)
            .header("X-Requested-With", "XMLHttpRequest")
            .body(Body::empty())
            .unwrap();
        let response = client.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let (status, body) = client.json("POST", "/lists/1/todos/2/delete", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "The specified todo was not found.");
    }

    #[tokio::test]
    async fn script_list_delete_answers_with_index_path() {
        let mut client = Client::new();
        client
            .json("POST", "/lists", Some(json!({"list_name": "Doomed"})))
            .await;

        let request = Request::builder()
            .method("POST")
            .uri("/lists/1/delete")
            .header(COOKIE, client.cookie.clone().unwrap())
            .header("X-Requested-With", "XMLHttpRequest")
            .body(Body::empty())
            .unwrap();
        let response = client.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"/lists");

        let (status, _) = client.json("GET", "/lists/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_and_malformed_ids() {
        let mut client = Client::new();

        let (status, _) = client.json("POST", "/lists/7/complete_all", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = client
            .json("POST", "/lists/7/todos", Some(json!({"todo": "x"})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = client.json("GET", "/lists/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn sessions_do_not_share_lists() {
        let mut alice = Client::new();
        alice
            .json("POST", "/lists", Some(json!({"list_name": "Private"})))
            .await;

        // same router, no cookie: a new session
        let mut bob = Client {
            app: alice.app.clone(),
            cookie: None,
        };
        let (_, body) = bob.json("GET", "/lists", None).await;
        assert_eq!(body, json!([]));
        assert_ne!(alice.cookie, bob.cookie);

        let (_, body) = alice.json("GET", "/lists", None).await;
        assert_eq!(body[0]["name"], "Private");
    }
}
