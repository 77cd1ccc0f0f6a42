//! Admin dashboard statistics.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::auth::AdminSession;
use crate::content::{Contact, ContactFilter, ContactStatus, Experience, Project, Skill};
use crate::http::api::crud::fetch_all;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::store::Record;

const FAILURE: &str = "Failed to fetch dashboard statistics";

async fn count<R: Record>(state: &AppState) -> Result<usize, ApiError> {
    let repo = state.repo::<R>();
    state
        .persist(|| repo.count())
        .await
        .map_err(|e| ApiError::from_store(e, "Dashboard", FAILURE))
}

/// Record counts per collection and unread messages.
pub async fn stats(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> Result<Json<Value>, ApiError> {
    let projects = count::<Project>(&state).await?;
    let skills = count::<Skill>(&state).await?;
    let experiences = count::<Experience>(&state).await?;
    let messages = count::<Contact>(&state).await?;

    let unread = ContactFilter {
        status: Some(ContactStatus::New),
    };
    let new_messages = fetch_all::<Contact>(&state, &unread).await?.len();

    Ok(Json(json!({
        "admin": session.sub,
        "projects": projects,
        "skills": skills,
        "experiences": experiences,
        "messages": messages,
        "newMessages": new_messages,
    })))
}
