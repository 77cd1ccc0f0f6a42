//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, limits, gate)
//! - Serve uploads and the public site directory
//! - Bind server to listener and drain on shutdown
//! - Flush the store once the last connection is gone

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, timeout::TimeoutLayer};

use crate::auth::{handlers as auth_handlers, SessionGuard, SessionSigner, Zones};
use crate::config::{AuthConfig, ServerConfig, UploadConfig};
use crate::http::{api, middleware::auth_gate, request, upload};
use crate::observability::metrics;
use crate::resilience::{self, RetryPolicy};
use crate::security::{self, RateLimiter};
use crate::store::{BlobStore, LocalBlobStore, Record, Repository, Store, StoreError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub blobs: Arc<dyn BlobStore>,
    pub retry_policy: RetryPolicy,
    pub sessions: Arc<SessionSigner>,
    pub guard: SessionGuard,
    pub zones: Arc<Zones>,
    pub auth: Arc<AuthConfig>,
    pub uploads: Arc<UploadConfig>,
}

impl AppState {
    pub fn new(config: &ServerConfig, store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        let retry_policy = RetryPolicy::try_from(&config.retries).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid retry settings, using defaults");
            RetryPolicy::default()
        });
        let sessions = Arc::new(SessionSigner::new(
            config.auth.session_secret.as_bytes(),
            Duration::from_secs(config.auth.session_ttl_secs),
        ));
        let guard = SessionGuard::new(sessions.clone(), config.auth.cookie_name.as_str());

        Self {
            store,
            blobs,
            retry_policy,
            sessions,
            guard,
            zones: Arc::new(Zones::from_config(&config.auth)),
            auth: Arc::new(config.auth.clone()),
            uploads: Arc::new(config.uploads.clone()),
        }
    }

    pub fn repo<R: Record>(&self) -> Repository<R> {
        Repository::new(self.store.clone())
    }

    /// Run one persistence call under the configured retry policy.
    pub async fn persist<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, StoreError>>,
    {
        resilience::execute(&self.retry_policy, op).await
    }
}

impl FromRef<AppState> for SessionGuard {
    fn from_ref(state: &AppState) -> Self {
        state.guard.clone()
    }
}

/// HTTP server for the portfolio site and its admin API.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    store: Arc<dyn Store>,
}

impl HttpServer {
    /// Create a server over `store`, storing uploads on the local disk.
    pub fn new(config: ServerConfig, store: Arc<dyn Store>) -> Self {
        let blobs = Arc::new(LocalBlobStore::from_config(&config.uploads));
        Self::with_blob_store(config, store, blobs)
    }

    pub fn with_blob_store(config: ServerConfig, store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        if config.auth.admin_password_hash.is_empty() {
            tracing::warn!("No admin password hash configured; admin login is disabled");
        }

        let state = AppState::new(&config, store.clone(), blobs);
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            store,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let contact_limiter = Arc::new(RateLimiter::from_config("contact", &config.security));
        let login_limiter = Arc::new(RateLimiter::from_config("login", &config.security));

        let login_routes = Router::new()
            .route("/api/auth/login", post(auth_handlers::login))
            .route(&config.auth.login_path, post(auth_handlers::login_form))
            .route_layer(middleware::from_fn_with_state(
                login_limiter,
                security::rate_limit_middleware,
            ))
            .route(&config.auth.login_path, get(auth_handlers::login_page));

        let mut router = Router::new()
            .merge(api::router(&config.auth.home_path, contact_limiter))
            .merge(login_routes)
            .route("/api/auth/logout", post(auth_handlers::logout))
            .route("/api/auth/session", get(auth_handlers::current_session))
            .route(
                "/api/upload",
                post(upload::upload).layer(security::limits::upload_body_limit(&config.uploads)),
            )
            .nest_service(
                &config.uploads.public_prefix,
                ServeDir::new(&config.uploads.directory),
            );

        router = match &config.site.directory {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router.fallback(api::not_found),
        };

        let mut router = router
            .layer(middleware::from_fn_with_state(state.clone(), auth_gate))
            .with_state(state)
            .layer(security::limits::json_body_limit(&config.security))
            .layer(middleware::from_fn(metrics::track_requests));

        if config.security.enable_headers {
            router = security::headers::apply(router);
        }

        let router = router.layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));
        request::with_request_tracing(router)
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then flush the store.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        if let Err(e) = self.store.flush().await {
            tracing::error!(error = %e, "Failed to flush store on shutdown");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
