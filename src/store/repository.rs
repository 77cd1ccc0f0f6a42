//! Typed access to one collection of the store.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::{EntityKind, Store, StoreError, StoreResult};

/// A domain record persisted as a document.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Order in which records are listed.
    fn listing_cmp(&self, other: &Self) -> Ordering;
}

/// Typed view over the documents of `R::KIND`.
pub struct Repository<R> {
    store: Arc<dyn Store>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Repository<R> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// All records, sorted by `Record::listing_cmp`.
    pub async fn list(&self) -> StoreResult<Vec<R>> {
        let docs = self.store.list(R::KIND).await?;
        let mut records = docs
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<R>, _>>()?;
        records.sort_by(R::listing_cmp);
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> StoreResult<R> {
        let doc = self.store.get(R::KIND, id).await?;
        Ok(serde_json::from_value(doc)?)
    }

    /// Insert a new record. Finding the identical document already stored
    /// counts as success, so an insert whose reply was lost can be repeated.
    pub async fn insert(&self, record: &R) -> StoreResult<()> {
        let doc = serde_json::to_value(record)?;
        let err = match self.store.insert(R::KIND, record.id(), doc.clone()).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        if matches!(err, StoreError::Conflict { .. })
            && self.store.get(R::KIND, record.id()).await.ok().as_ref() == Some(&doc)
        {
            return Ok(());
        }
        Err(err)
    }

    pub async fn replace(&self, record: &R) -> StoreResult<()> {
        let doc = serde_json::to_value(record)?;
        self.store.replace(R::KIND, record.id(), doc).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete(R::KIND, id).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.store.list(R::KIND).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        rank: i64,
    }

    impl Record for Note {
        const KIND: EntityKind = EntityKind::Skill;

        fn id(&self) -> &str {
            &self.id
        }

        fn listing_cmp(&self, other: &Self) -> Ordering {
            self.rank.cmp(&other.rank)
        }
    }

    fn note(id: &str, rank: i64) -> Note {
        Note {
            id: id.to_string(),
            rank,
        }
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let repo = Repository::<Note>::new(Arc::new(MemoryStore::new(None)));
        repo.insert(&note("c", 3)).await.unwrap();
        repo.insert(&note("a", 1)).await.unwrap();
        repo.insert(&note("b", 2)).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let repo = Repository::<Note>::new(Arc::new(MemoryStore::new(None)));
        repo.insert(&note("x", 9)).await.unwrap();
        repo.replace(&note("x", 10)).await.unwrap();
        assert_eq!(repo.get("x").await.unwrap(), note("x", 10));

        repo.delete("x").await.unwrap();
        assert!(repo.get("x").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_repeated_insert_is_idempotent() {
        let repo = Repository::<Note>::new(Arc::new(MemoryStore::default()));
        repo.insert(&note("x", 1)).await.unwrap();
        repo.insert(&note("x", 1)).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        assert!(matches!(
            repo.insert(&note("x", 2)).await,
            Err(StoreError::Conflict { .. })
        ));
        assert_eq!(repo.get("x").await.unwrap(), note("x", 1));
    }
}
