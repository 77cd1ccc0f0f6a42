//! Contact form and the admin inbox.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::content::{Contact, ContactFilter, ContactInput, Editable, Validate};
use crate::http::api::crud::{fetch_all, fetch_one};
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// `POST /api/contact`, public.
pub async fn submit(
    State(state): State<AppState>,
    Json(input): Json<ContactInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    input.validate()?;

    let contact = Contact::create(input, Uuid::new_v4().to_string(), Utc::now());
    let repo = state.repo::<Contact>();
    state
        .persist(|| repo.insert(&contact))
        .await
        .map_err(|e| ApiError::from_store(e, Contact::LABEL, "Failed to send message. Please try again."))?;

    tracing::info!(id = %contact.id, "Contact message received");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Message sent successfully",
            "id": contact.id,
        })),
    ))
}

/// `GET /api/contact`, admin only.
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminSession,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    Ok(Json(fetch_all::<Contact>(&state, &filter).await?))
}

/// `GET /api/contact/{id}`, admin only.
pub async fn get(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    Ok(Json(fetch_one::<Contact>(&state, &id).await?))
}
