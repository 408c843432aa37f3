//! Cookie-identified sessions for the in-memory backend
//!
//! Each session owns one `MemoryStore`. The store is locked for the whole
//! request that uses it, so requests of one session never interleave.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use todoctl_core::store::{MemoryStore, TodoStore};
use todoctl_core::{ListId, StoreResult, Todo, TodoId, TodoList};

use crate::state::{AppState, Backend};

/// Cookie carrying the session id
pub const SESSION_COOKIE: &str = "todoctl_session";

/// One session's store
#[derive(Clone)]
pub struct SessionHandle {
    id: Uuid,
    store: Arc<Mutex<MemoryStore>>,
}

impl SessionHandle {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            store: Arc::new(Mutex::new(MemoryStore::new())),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for exclusive access to this session's store.
    pub async fn lock(&self) -> SessionStore {
        SessionStore(self.store.clone().lock_owned().await)
    }
}

/// Default idle time after which a session is dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Default upper bound on live sessions
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// All live sessions, keyed by id
///
/// Sessions idle longer than `idle_timeout` are dropped, and the registry
/// never holds more than `max_sessions`: creating one past the cap evicts
/// the least recently seen.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Look up a live session and mark it as seen.
    ///
    /// Returns None if the session is unknown or has gone idle.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        if now.duration_since(entry.last_seen) >= self.idle_timeout {
            sessions.remove(&id);
            tracing::debug!(session = %id, "session expired");
            return None;
        }
        entry.last_seen = now;
        Some(entry.handle.clone())
    }

    /// Start a session with an empty store.
    pub async fn create(&self) -> SessionHandle {
        let now = Instant::now();
        let handle = SessionHandle::new(Uuid::new_v4());
        let mut sessions = self.sessions.write().await;

        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < idle_timeout);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                    tracing::debug!(session = %id, "session evicted");
                }
                None => break,
            }
        }

        sessions.insert(
            handle.id,
            SessionEntry {
                handle: handle.clone(),
                last_seen: now,
            },
        );
        tracing::debug!(session = %handle.id, live = sessions.len(), "session created");
        handle
    }

    /// Drop every session idle past the timeout; returns how many went.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let idle_timeout = self.idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < idle_timeout);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Session id from the request's `Cookie` headers, if present and well-formed.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

/// Middleware: resolve or start the caller's session and expose it to
/// handlers through request extensions.
///
/// Reads without a live session get a throwaway empty store; only a
/// request that can write registers a session and sets the cookie.
pub async fn attach_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Backend::Memory(registry) = &state.backend else {
        return next.run(request).await;
    };

    let existing = match session_id_from_headers(request.headers()) {
        Some(id) => registry.get(id).await,
        None => None,
    };

    let (handle, fresh) = match existing {
        Some(handle) => (handle, false),
        None if is_read_only(request.method()) => (SessionHandle::new(Uuid::new_v4()), false),
        None => (registry.create().await, true),
    };

    let id = handle.id();
    request.extensions_mut().insert(handle);

    let mut response = next.run(request).await;
    if fresh {
        match HeaderValue::from_str(&session_cookie(id)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("could not encode session cookie: {}", e),
        }
    }
    response
}

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// A session's store, held locked for the lifetime of this value
pub struct SessionStore(OwnedMutexGuard<MemoryStore>);

#[async_trait]
impl TodoStore for SessionStore {
    async fn list_all(&mut self) -> StoreResult<Vec<TodoList>> {
        self.0.list_all().await
    }

    async fn find_list(&mut self, id: ListId) -> StoreResult<Option<TodoList>> {
        self.0.find_list(id).await
    }

    async fn create_list(&mut self, name: &str) -> StoreResult<TodoList> {
        self.0.create_list(name).await
    }

    async fn rename_list(&mut self, id: ListId, new_name: &str) -> StoreResult<()> {
        self.0.rename_list(id, new_name).await
    }

    async fn delete_list(&mut self, id: ListId) -> StoreResult<()> {
        self.0.delete_list(id).await
    }

    async fn add_todo(&mut self, list_id: ListId, name: &str) -> StoreResult<Option<Todo>> {
        self.0.add_todo(list_id, name).await
    }

    async fn delete_todo(&mut self, list_id: ListId, todo_id: TodoId) -> StoreResult<()> {
        self.0.delete_todo(list_id, todo_id).await
    }

    async fn set_todo_completed(
        &mut self,
        list_id: ListId,
        todo_id: TodoId,
        completed: bool,
    ) -> StoreResult<()> {
        self.0.set_todo_completed(list_id, todo_id, completed).await
    }

    async fn complete_all(&mut self, list_id: ListId) -> StoreResult<()> {
        self.0.complete_all(list_id).await
    }
}
