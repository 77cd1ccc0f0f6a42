//! Login, logout and session endpoints.

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extract::AdminSession;
use crate::auth::password::verify_password;
use crate::auth::session::{clear_cookie, session_cookie, Role, Session};
use crate::config::AuthConfig;
use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// True when `credentials` name the configured administrator.
pub fn check_credentials(config: &AuthConfig, credentials: &Credentials) -> bool {
    let email = credentials.email.trim();
    if email.is_empty() || credentials.password.is_empty() {
        return false;
    }
    email.eq_ignore_ascii_case(&config.admin_email)
        && verify_password(&credentials.password, &config.admin_password_hash)
}

/// Runs the PBKDF2 check on the blocking pool.
async fn check_credentials_blocking(state: &AppState, credentials: Credentials) -> bool {
    let auth = state.auth.clone();
    match tokio::task::spawn_blocking(move || check_credentials(&auth, &credentials)).await {
        Ok(valid) => valid,
        Err(err) => {
            tracing::error!(error = %err, "Credential check did not complete");
            false
        }
    }
}

async fn start_session(state: &AppState, credentials: Credentials) -> Option<(String, Session, String)> {
    let email = credentials.email.trim().to_string();
    if !check_credentials_blocking(state, credentials).await {
        tracing::warn!(email = %email, "Failed login attempt");
        return None;
    }
    let (token, session) = state.sessions.issue(&state.auth.admin_email, Role::Admin, Utc::now());
    let cookie = session_cookie(&state.auth.cookie_name, &token, state.sessions.ttl());
    tracing::info!(email = %session.sub, "Admin logged in");
    Some((token, session, cookie))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Response, ApiError> {
    let (token, session, cookie) =
        start_session(&state, credentials).await.ok_or(ApiError::InvalidCredentials)?;

    let body = json!({
        "token": token,
        "email": session.sub,
        "role": session.role,
        "expiresAt": session.expires_at(),
    });
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// `POST /api/auth/logout`
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = clear_cookie(&state.auth.cookie_name);
    ([(header::SET_COOKIE, cookie)], Json(json!({ "success": true }))).into_response()
}

/// `GET /api/auth/session`
pub async fn current_session(AdminSession(session): AdminSession) -> Json<serde_json::Value> {
    Json(json!({
        "email": session.sub,
        "role": session.role,
        "expiresAt": session.expires_at(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageQuery {
    pub error: Option<String>,
}

/// `GET /login`
pub async fn login_page(State(state): State<AppState>, Query(query): Query<LoginPageQuery>) -> Html<String> {
    let error = if query.error.is_some() {
        r#"<p class="error">Invalid email or password.</p>"#
    } else {
        ""
    };
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Admin login</title></head>
<body>
<h1>Admin login</h1>
{error}
<form method="post" action="{action}">
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#,
        error = error,
        action = state.auth.login_path,
    ))
}

/// `POST /login`, the form counterpart of the JSON login.
pub async fn login_form(State(state): State<AppState>, Form(credentials): Form<Credentials>) -> Response {
    match start_session(&state, credentials).await {
        Some((_, _, cookie)) => (
            [(header::SET_COOKIE, cookie)],
            Redirect::to(&state.auth.home_path),
        )
            .into_response(),
        None => Redirect::to(&format!("{}?error=1", state.auth.login_path)).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password_with;

    fn config() -> AuthConfig {
        AuthConfig {
            admin_email: "admin@example.com".into(),
            admin_password_hash: hash_password_with("correct horse", b"salt", 10),
            ..AuthConfig::default()
        }
    }

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_valid_credentials() {
        assert!(check_credentials(&config(), &creds("admin@example.com", "correct horse")));
        assert!(check_credentials(&config(), &creds(" Admin@Example.com ", "correct horse")));
    }

    #[test]
    fn test_invalid_credentials() {
        assert!(!check_credentials(&config(), &creds("admin@example.com", "wrong")));
        assert!(!check_credentials(&config(), &creds("other@example.com", "correct horse")));
        assert!(!check_credentials(&config(), &creds("", "")));
    }

    #[test]
    fn test_no_hash_configured() {
        let config = AuthConfig::default();
        assert!(!check_credentials(&config, &creds(&config.admin_email, "anything")));
    }

    fn state() -> AppState {
        let mut server = crate::config::ServerConfig::default();
        server.auth = config();
        AppState::new(
            &server,
            std::sync::Arc::new(crate::store::MemoryStore::default()),
            std::sync::Arc::new(crate::store::LocalBlobStore::from_config(&server.uploads)),
        )
    }

    #[tokio::test]
    async fn test_session_starts_only_for_the_admin() {
        let state = state();

        let (token, session, cookie) = start_session(&state, creds("admin@example.com", "correct horse"))
            .await
            .unwrap();
        assert_eq!(session.sub, "admin@example.com");
        assert_eq!(state.sessions.verify_at(&token, Utc::now()), Some(session));
        assert!(cookie.starts_with(&format!("{}={}", state.auth.cookie_name, token)));

        assert!(start_session(&state, creds("admin@example.com", "wrong")).await.is_none());
    }
}
