//! JSON API routes.
//!
//! | Path                   | Read   | Write  |
//! |------------------------|--------|--------|
//! | `/api/projects`        | public | admin  |
//! | `/api/skills`          | public | admin  |
//! | `/api/experience`      | public | admin  |
//! | `/api/contact`         | admin  | public submit, admin triage |
//! | dashboard (home path)  | admin  | -      |

pub mod contact;
pub mod crud;
pub mod dashboard;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::content::{Contact, Editable, Experience, Project, Skill};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::security::{rate_limit_middleware, RateLimiter};

pub fn router(home_path: &str, contact_limiter: Arc<RateLimiter>) -> Router<AppState> {
    let submit = post(contact::submit).layer(middleware::from_fn_with_state(
        contact_limiter,
        rate_limit_middleware,
    ));

    Router::new()
        .route("/api/health", get(health))
        .merge(collection::<Project>("/api/projects"))
        .merge(collection::<Skill>("/api/skills"))
        .merge(collection::<Experience>("/api/experience"))
        .route("/api/contact", get(contact::list).merge(submit))
        .route(
            "/api/contact/{id}",
            get(contact::get)
                .put(crud::update::<Contact>)
                .delete(crud::delete::<Contact>),
        )
        .route(home_path, get(dashboard::stats))
}

fn collection<R: Editable>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(crud::list::<R>).post(crud::create::<R>))
        .route(
            &format!("{}/{{id}}", path),
            get(crud::get::<R>)
                .put(crud::update::<R>)
                .delete(crud::delete::<R>),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Resource")
}
