//! Session lookup for handlers and middleware.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use crate::auth::session::{request_tokens, Session, TokenVerifier};
use crate::http::response::ApiError;

/// Verifier plus the cookie it reads; shared by the gate and the API routes.
#[derive(Clone)]
pub struct SessionGuard {
    verifier: Arc<dyn TokenVerifier>,
    cookie_name: Arc<str>,
}

impl SessionGuard {
    pub fn new(verifier: Arc<dyn TokenVerifier>, cookie_name: impl Into<Arc<str>>) -> Self {
        Self {
            verifier,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// The first valid session carried by `headers`, if any.
    pub fn session(&self, headers: &HeaderMap) -> Option<Session> {
        request_tokens(headers, &self.cookie_name).find_map(|token| self.verifier.verify(token))
    }
}

/// Extractor for routes that need an administrator; rejects with 401.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl<S> FromRequestParts<S> for AdminSession
where
    SessionGuard: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = SessionGuard::from_ref(state);
        match guard.session(&parts.headers) {
            Some(session) => Ok(AdminSession(session)),
            None => {
                tracing::debug!(path = %parts.uri.path(), "Rejected request without a valid session");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
