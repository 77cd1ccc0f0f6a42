//! Signed session tokens.
//!
//! # Format
//! ```text
//! base64url(claims JSON) "." base64url(HMAC-SHA256(secret, first part))
//! ```
//!
//! # Design Decisions
//! - Stateless: the token carries its own expiry, nothing is stored
//! - Verification is total: any bad token is simply "no session"
//! - Signature checked in constant time before the claims are parsed

use std::time::Duration;

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Account email.
    pub sub: String,
    pub role: Role,
    /// Issued at, unix seconds.
    pub iat: i64,
    /// Expires at, unix seconds.
    pub exp: i64,
}

impl Session {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Capability the authorization layers use to check a credential.
pub trait TokenVerifier: Send + Sync {
    /// The session behind `token`, or `None` when it is invalid or expired.
    fn verify(&self, token: &str) -> Option<Session>;
}

/// Issues and verifies session tokens with one HMAC key.
#[derive(Clone)]
pub struct SessionSigner {
    mac: HmacSha256,
    ttl: Duration,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
        Self { mac, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `email` valid from `now` for the configured TTL.
    pub fn issue(&self, email: &str, role: Role, now: DateTime<Utc>) -> (String, Session) {
        let iat = now.timestamp();
        let session = Session {
            sub: email.to_string(),
            role,
            iat,
            exp: iat.saturating_add(self.ttl.as_secs() as i64),
        };
        // Serializing a struct of strings and integers cannot fail.
        let claims = serde_json::to_vec(&session).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(claims);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        (format!("{}.{}", payload, signature), session)
    }

    /// Verify `token` against the clock at `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let (payload, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let claims = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let session: Session = serde_json::from_slice(&claims).ok()?;
        (session.exp > now.timestamp()).then_some(session)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

impl TokenVerifier for SessionSigner {
    fn verify(&self, token: &str) -> Option<Session> {
        self.verify_at(token, Utc::now())
    }
}

/// Credentials carried by a request, in the order they are tried: the
/// session cookie, then a bearer token.
pub fn request_tokens<'a>(headers: &'a HeaderMap, cookie_name: &str) -> impl Iterator<Item = &'a str> + 'a {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty());

    let from_bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    from_cookie.into_iter().chain(from_bearer)
}

/// `Set-Cookie` value that stores `token` for `max_age`.
pub fn session_cookie(cookie_name: &str, token: &str, max_age: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cookie_name,
        token,
        max_age.as_secs()
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie(cookie_name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", cookie_name)
}
