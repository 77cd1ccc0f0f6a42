//! Generic collection endpoints.
//!
//! One set of handlers serves every `Editable` record type. Each store call
//! runs through the retry executor; validation happens before the first one.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AdminSession;
use crate::content::{Editable, Validate};
use crate::http::response::ApiError;
use crate::http::server::AppState;

/// All records of `R` matching `filter`, in listing order.
pub async fn fetch_all<R: Editable>(state: &AppState, filter: &R::Filter) -> Result<Vec<R>, ApiError> {
    let repo = state.repo::<R>();
    let records = state
        .persist(|| repo.list())
        .await
        .map_err(|e| ApiError::from_store(e, R::LABEL, format!("Failed to fetch {}", R::PLURAL)))?;
    Ok(records.into_iter().filter(|r| r.matches(filter)).collect())
}

pub async fn fetch_one<R: Editable>(state: &AppState, id: &str) -> Result<R, ApiError> {
    let repo = state.repo::<R>();
    state
        .persist(|| repo.get(id))
        .await
        .map_err(|e| ApiError::from_store(e, R::LABEL, format!("Failed to fetch {}", R::NOUN)))
}

pub async fn list<R: Editable>(
    State(state): State<AppState>,
    Query(filter): Query<R::Filter>,
) -> Result<Json<Vec<R>>, ApiError> {
    Ok(Json(fetch_all::<R>(&state, &filter).await?))
}

pub async fn get<R: Editable>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<R>, ApiError> {
    Ok(Json(fetch_one::<R>(&state, &id).await?))
}

pub async fn create<R: Editable>(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<R::Create>,
) -> Result<(StatusCode, Json<R>), ApiError> {
    input.validate()?;

    let record = R::create(input, Uuid::new_v4().to_string(), Utc::now());
    let repo = state.repo::<R>();
    state
        .persist(|| repo.insert(&record))
        .await
        .map_err(|e| ApiError::from_store(e, R::LABEL, format!("Failed to create {}", R::NOUN)))?;

    tracing::info!(kind = %R::KIND, id = %record.id(), "Record created");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<R: Editable>(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Json(input): Json<R::Update>,
) -> Result<Json<R>, ApiError> {
    input.validate()?;

    let failure = || format!("Failed to update {}", R::NOUN);
    let repo = state.repo::<R>();
    let current = state
        .persist(|| repo.get(&id))
        .await
        .map_err(|e| ApiError::from_store(e, R::LABEL, failure()))?;

    let updated = current.update(input, Utc::now());
    state
        .persist(|| repo.replace(&updated))
        .await
        .map_err(|e| ApiError::from_store(e, R::LABEL, failure()))?;

    tracing::info!(kind = %R::KIND, id = %id, "Record updated");
    Ok(Json(updated))
}

pub async fn delete<R: Editable>(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let repo = state.repo::<R>();
    let mut attempted = false;
    state
        .persist(|| {
            let retry = std::mem::replace(&mut attempted, true);
            let (repo, id) = (&repo, id.as_str());
            async move {
                match repo.delete(id).await {
                    // An earlier attempt removed it before failing.
                    Err(err) if retry && err.is_not_found() => Ok(()),
                    other => other,
                }
            }
        })
        .await
        .map_err(|e| ApiError::from_store(e, R::LABEL, format!("Failed to delete {}", R::NOUN)))?;

    tracing::info!(kind = %R::KIND, id = %id, "Record deleted");
    Ok(Json(json!({ "success": true })))
}
