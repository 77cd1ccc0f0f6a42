//! In-memory document store with an optional JSON snapshot file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::Mutex;

use crate::store::{Document, EntityKind, Store, StoreError, StoreResult};

type Snapshot = BTreeMap<EntityKind, Vec<Document>>;
type Key = (EntityKind, String);

enum Change {
    Put(Document),
    Remove,
}

/// Concurrent in-memory store.
///
/// With a snapshot path, every write rewrites the snapshot file (write to a
/// temporary file, then rename) so a restart sees the same data. The change
/// reaches memory only after the snapshot holding it is on disk, so a failed
/// write leaves nothing behind and can be retried as is.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<DashMap<Key, Document>>,
    snapshot_path: Option<PathBuf>,
    save_lock: Arc<Mutex<()>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(snapshot_path: Option<PathBuf>) -> Self {
        Self {
            docs: Arc::new(DashMap::new()),
            snapshot_path,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open a store backed by `path`, loading it if the file exists.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let store = Self::new(Some(path.clone()));

        if tokio::fs::try_exists(&path).await? {
            let bytes = tokio::fs::read(&path).await?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
            for (kind, docs) in snapshot {
                for doc in docs {
                    let id = document_id(kind, &doc)?;
                    store.docs.insert((kind, id), doc);
                }
            }
            tracing::info!(path = %path.display(), records = store.docs.len(), "Loaded snapshot");
        }
        Ok(store)
    }

    /// Number of documents of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.docs.iter().filter(|r| r.key().0 == kind).count()
    }

    async fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let _guard = self.save_lock.lock().await;
        let bytes = self.snapshot_bytes(None)?;
        write_snapshot(path, bytes).await
    }

    /// Serialize every document, with `pending` applied on top.
    fn snapshot_bytes(&self, pending: Option<(&Key, &Change)>) -> StoreResult<Vec<u8>> {
        let mut snapshot = Snapshot::new();
        for r in self.docs.iter() {
            if pending.is_some_and(|(key, _)| key == r.key()) {
                continue;
            }
            snapshot.entry(r.key().0).or_default().push(r.value().clone());
        }
        if let Some((key, Change::Put(doc))) = pending {
            snapshot.entry(key.0).or_default().push(doc.clone());
        }
        Ok(serde_json::to_vec_pretty(&snapshot)?)
    }

    /// Check, persist, then apply one change. Writers are serialized.
    async fn write(&self, kind: EntityKind, id: &str, change: Change, must_exist: bool) -> StoreResult<()> {
        let _guard = self.save_lock.lock().await;
        let key = (kind, id.to_string());

        match (self.docs.contains_key(&key), must_exist) {
            (true, false) => {
                return Err(StoreError::Conflict {
                    kind,
                    id: id.to_string(),
                })
            }
            (false, true) => return Err(StoreError::not_found(kind, id)),
            _ => {}
        }

        if let Some(path) = &self.snapshot_path {
            let bytes = self.snapshot_bytes(Some((&key, &change)))?;
            write_snapshot(path, bytes).await?;
        }

        match change {
            Change::Put(doc) => {
                self.docs.insert(key, doc);
            }
            Change::Remove => {
                self.docs.remove(&key);
            }
        }
        Ok(())
    }
}

async fn write_snapshot(path: &Path, bytes: Vec<u8>) -> StoreResult<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    tracing::debug!(path = %path.display(), "Snapshot saved");
    Ok(())
}

fn document_id(kind: EntityKind, doc: &Document) -> StoreResult<String> {
    doc.get("id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            StoreError::Corrupt(serde_json::Error::io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} document without an id", kind),
            )))
        })
}

impl Store for MemoryStore {
    fn list(&self, kind: EntityKind) -> BoxFuture<'_, StoreResult<Vec<Document>>> {
        let docs = self
            .docs
            .iter()
            .filter(|r| r.key().0 == kind)
            .map(|r| r.value().clone())
            .collect();
        std::future::ready(Ok(docs)).boxed()
    }

    fn get<'a>(&'a self, kind: EntityKind, id: &'a str) -> BoxFuture<'a, StoreResult<Document>> {
        let found = self
            .docs
            .get(&(kind, id.to_string()))
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::not_found(kind, id));
        std::future::ready(found).boxed()
    }

    fn insert<'a>(&'a self, kind: EntityKind, id: &'a str, doc: Document) -> BoxFuture<'a, StoreResult<()>> {
        self.write(kind, id, Change::Put(doc), false).boxed()
    }

    fn replace<'a>(&'a self, kind: EntityKind, id: &'a str, doc: Document) -> BoxFuture<'a, StoreResult<()>> {
        self.write(kind, id, Change::Put(doc), true).boxed()
    }

    fn delete<'a>(&'a self, kind: EntityKind, id: &'a str) -> BoxFuture<'a, StoreResult<()>> {
        self.write(kind, id, Change::Remove, true).boxed()
    }

    fn flush(&self) -> BoxFuture<'_, StoreResult<()>> {
        self.save().boxed()
    }
}
