//! Request authorization gate.
//!
//! Decides, per request, whether to let it through or redirect it, from two
//! inputs only: whether the caller holds a valid session and which zone the
//! path falls in. Token verification happens elsewhere; this is a pure
//! function of its inputs.
//!
//! | protected | login | valid token | decision            |
//! |-----------|-------|-------------|---------------------|
//! | yes       | -     | no          | redirect to login   |
//! | yes       | -     | yes         | allow               |
//! | -         | yes   | yes         | redirect to home    |
//! | -         | yes   | no          | allow               |
//! | no        | no    | -           | allow               |

use crate::config::AuthConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow,
    RedirectTo(String),
}

impl AuthDecision {
    pub fn label(&self) -> &'static str {
        match self {
            AuthDecision::Allow => "allow",
            AuthDecision::RedirectTo(_) => "redirect",
        }
    }
}

/// The protected zone and the login entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zones {
    protected_prefix: String,
    login_path: String,
    home_path: String,
}

impl Zones {
    pub fn new(
        protected_prefix: impl Into<String>,
        login_path: impl Into<String>,
        home_path: impl Into<String>,
    ) -> Self {
        Self {
            protected_prefix: protected_prefix.into(),
            login_path: login_path.into(),
            home_path: home_path.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.protected_prefix, &config.login_path, &config.home_path)
    }

    /// Prefix match on whole path segments: `/admin` covers `/admin/x`
    /// but not `/administrator`.
    pub fn is_protected(&self, path: &str) -> bool {
        match path.strip_prefix(self.protected_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    pub fn is_login(&self, path: &str) -> bool {
        path == self.login_path
    }

    /// True when the decision for `path` can depend on the session.
    pub fn is_guarded(&self, path: &str) -> bool {
        self.is_protected(path) || self.is_login(path)
    }

    pub fn decide(&self, has_valid_token: bool, path: &str) -> AuthDecision {
        if self.is_protected(path) {
            return if has_valid_token {
                AuthDecision::Allow
            } else {
                AuthDecision::RedirectTo(self.login_path.clone())
            };
        }

        if self.is_login(path) && has_valid_token {
            return AuthDecision::RedirectTo(self.home_path.clone());
        }

        AuthDecision::Allow
    }
}

impl Default for Zones {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}
