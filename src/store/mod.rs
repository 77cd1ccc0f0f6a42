//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! Route handler
//!     → resilience::execute (retry transient failures)
//!     → repository.rs (typed record <-> document)
//!     → Store trait object (memory.rs, or a test double)
//!     → snapshot file (optional)
//! ```
//!
//! # Design Decisions
//! - One store instance, built in `main` and injected; no global client
//! - Store methods return boxed futures so the trait stays object-safe
//! - Every failure carries a classification for the retry executor

pub mod blob;
pub mod error;
pub mod memory;
pub mod repository;

use std::fmt;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

pub use blob::{BlobStore, LocalBlobStore};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repository::{Record, Repository};

/// Stored document; always a JSON object with a string `id` field.
pub type Document = serde_json::Value;

/// The record collections the service persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Skill,
    Experience,
    Contact,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Project,
        EntityKind::Skill,
        EntityKind::Experience,
        EntityKind::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Skill => "skill",
            EntityKind::Experience => "experience",
            EntityKind::Contact => "contact",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document persistence collaborator.
pub trait Store: Send + Sync {
    /// All documents of one kind, in no particular order.
    fn list(&self, kind: EntityKind) -> BoxFuture<'_, StoreResult<Vec<Document>>>;

    fn get<'a>(&'a self, kind: EntityKind, id: &'a str) -> BoxFuture<'a, StoreResult<Document>>;

    /// Insert a new document; `Conflict` if the id is taken.
    fn insert<'a>(&'a self, kind: EntityKind, id: &'a str, doc: Document) -> BoxFuture<'a, StoreResult<()>>;

    /// Replace an existing document; `NotFound` if it is missing.
    fn replace<'a>(&'a self, kind: EntityKind, id: &'a str, doc: Document) -> BoxFuture<'a, StoreResult<()>>;

    fn delete<'a>(&'a self, kind: EntityKind, id: &'a str) -> BoxFuture<'a, StoreResult<()>>;

    /// Persist anything buffered. Called on shutdown.
    fn flush(&self) -> BoxFuture<'_, StoreResult<()>>;
}
