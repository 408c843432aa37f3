//! Custom Axum extractors

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Json, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use todoctl_core::store::{PgStore, TodoStore};

use super::error::ApiError;
use crate::session::SessionHandle;
use crate::state::{AppState, Backend};

/// The request's storage backend.
///
/// With the in-memory backend this holds the session's store locked until
/// the handler returns.
pub struct Storage(Box<dyn TodoStore>);

impl Deref for Storage {
    type Target = dyn TodoStore;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl DerefMut for Storage {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.0
    }
}

impl FromRequestParts<Arc<AppState>> for Storage {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match &state.backend {
            Backend::Postgres(pool) => Ok(Self(Box::new(PgStore::new(pool.clone())))),
            Backend::Memory(_) => {
                let handle = parts
                    .extensions
                    .get::<SessionHandle>()
                    .cloned()
                    .ok_or_else(|| ApiError::Internal {
                        message: "session layer not installed".into(),
                    })?;
                Ok(Self(Box::new(handle.lock().await)))
            }
        }
    }
}

/// Path parameters, rejected as JSON 400 when they do not parse
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest {
                message: e.body_text(),
            })?;
        Ok(Self(value))
    }
}

/// JSON request body, rejected as JSON 400 when malformed
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest {
                message: e.body_text(),
            })?;
        Ok(Self(value))
    }
}
