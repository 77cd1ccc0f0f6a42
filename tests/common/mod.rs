//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use portfolio_server::auth::password::hash_password_with;
use portfolio_server::config::ServerConfig;
use portfolio_server::lifecycle::Shutdown;
use portfolio_server::resilience::ConnectivityCode;
use portfolio_server::store::{Document, EntityKind, MemoryStore, Store, StoreError, StoreResult};
use portfolio_server::HttpServer;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Config for a test server: fast retries, generous rate limits, uploads in `upload_dir`.
pub fn test_config(upload_dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.retries.max_attempts = 3;
    config.retries.base_delay_ms = 10;
    config.auth.admin_email = ADMIN_EMAIL.to_string();
    config.auth.admin_password_hash = hash_password_with(ADMIN_PASSWORD, b"integration-salt", 10);
    config.auth.session_secret = "integration-test-secret-0123456789abcdef".to_string();
    config.uploads.directory = upload_dir.to_string_lossy().into_owned();
    config.security.rate_limit_per_second = 1000;
    config.security.rate_limit_burst = 1000;
    config
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

/// Start a server on an ephemeral port.
pub async fn start_server(config: ServerConfig, store: Arc<dyn Store>) -> TestServer {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// HTTP client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Log in as the test admin and return the session token.
pub async fn login(client: &reqwest::Client, server: &TestServer) -> String {
    let res = client
        .post(server.url("/api/auth/login"))
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// Failure injected by `FlakyStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Connection refused; retried by the executor.
    Unreachable,
    /// A storage error that retrying cannot fix.
    Disk,
    /// The call reaches the store, then the connection drops before the
    /// reply; retried by the executor.
    LostReply,
}

/// `Store` wrapper that fails the next N calls, then delegates.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    remaining_failures: AtomicU32,
    fault: Mutex<Option<Fault>>,
    calls: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: u32, fault: Fault) {
        *self.fault.lock().unwrap() = Some(fault);
        self.remaining_failures.store(count, Ordering::SeqCst);
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Calls made since the last `fail_next` (or creation).
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.inner.count(kind)
    }

    fn next_fault(&self) -> Option<Fault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .ok()
            .and_then(|_| *self.fault.lock().unwrap())
    }

    async fn run<T>(&self, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match self.next_fault() {
            None => call.await,
            Some(Fault::Unreachable) => Err(StoreError::Connectivity(ConnectivityCode::Unreachable)),
            Some(Fault::Disk) => Err(StoreError::Io(std::io::Error::other("disk corrupted"))),
            Some(Fault::LostReply) => {
                call.await?;
                Err(StoreError::Connectivity(ConnectivityCode::ConnectionClosed))
            }
        }
    }
}

impl Store for FlakyStore {
    fn list(&self, kind: EntityKind) -> BoxFuture<'_, StoreResult<Vec<Document>>> {
        self.run(self.inner.list(kind)).boxed()
    }

    fn get<'a>(&'a self, kind: EntityKind, id: &'a str) -> BoxFuture<'a, StoreResult<Document>> {
        self.run(self.inner.get(kind, id)).boxed()
    }

    fn insert<'a>(&'a self, kind: EntityKind, id: &'a str, doc: Document) -> BoxFuture<'a, StoreResult<()>> {
        self.run(self.inner.insert(kind, id, doc)).boxed()
    }

    fn replace<'a>(&'a self, kind: EntityKind, id: &'a str, doc: Document) -> BoxFuture<'a, StoreResult<()>> {
        self.run(self.inner.replace(kind, id, doc)).boxed()
    }

    fn delete<'a>(&'a self, kind: EntityKind, id: &'a str) -> BoxFuture<'a, StoreResult<()>> {
        self.run(self.inner.delete(kind, id)).boxed()
    }

    fn flush(&self) -> BoxFuture<'_, StoreResult<()>> {
        self.inner.flush()
    }
}

pub fn sample_project() -> Value {
    json!({
        "title": "Portfolio",
        "description": "This site",
        "imageUrl": "/uploads/cover.png",
        "githubUrl": "https://github.com/example/portfolio",
        "technologies": ["Rust", "axum"],
        "featured": true,
        "order": "2"
    })
}

pub fn sample_message() -> Value {
    json!({
        "name": "Ada",
        "email": "Ada@Example.com",
        "subject": "Hello",
        "message": "Nice work!"
    })
}
