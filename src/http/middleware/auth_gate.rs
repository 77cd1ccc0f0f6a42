//! Page-level authorization gate.
//!
//! Runs before routing for every request. Paths outside the protected zone
//! and the login page pass through without a token lookup.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::AuthDecision;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn auth_gate(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path();
    if !state.zones.is_guarded(path) {
        return next.run(request).await;
    }

    let has_valid_token = state.guard.session(request.headers()).is_some();
    let decision = state.zones.decide(has_valid_token, path);
    metrics::record_auth_decision(decision.label());

    match decision {
        AuthDecision::Allow => next.run(request).await,
        AuthDecision::RedirectTo(target) => {
            tracing::debug!(path = %request.uri().path(), target = %target, "Gate redirect");
            // Targets only serve GET, so other methods are turned into one.
            let method = request.method();
            if *method == Method::GET || *method == Method::HEAD {
                Redirect::temporary(&target).into_response()
            } else {
                Redirect::to(&target).into_response()
            }
        }
    }
}
