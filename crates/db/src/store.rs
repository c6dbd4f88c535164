use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::criteria::{matches, Criteria, Fields};

/// A keyed entity that can live in a [`Store`].
pub trait Record: Fields + Clone + Send + Sync + 'static {
    /// The field that carries [`Record::id`], so ids can be used as criteria.
    const ID_FIELD: Self::Field;

    fn id(&self) -> Uuid;

    /// Refresh the modification timestamp to `at`, never moving it backwards.
    fn touch(&mut self, at: DateTime<Utc>);
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} already exists")]
    Duplicate(Uuid),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Keyed record storage with criteria-filtered reads.
///
/// Every method is atomic with respect to the others: a scan never observes
/// a half-applied write.
#[async_trait]
pub trait Store<R: Record>: Send + Sync {
    /// Add a new record. Ids are unique; a collision is an error.
    async fn insert(&self, record: R) -> Result<R, StoreError>;

    /// All records satisfying `criteria`, in insertion order.
    async fn get_by_criteria(&self, criteria: &Criteria<R::Field>) -> Result<Vec<R>, StoreError>;

    /// Overwrite the record stored under `record.id()` (or add it), touching
    /// its modification timestamp with `at`.
    async fn upsert(&self, record: R, at: DateTime<Utc>) -> Result<R, StoreError>;

    /// Delete the record with `id`. Returns whether anything was removed.
    async fn remove(&self, id: Uuid) -> Result<bool, StoreError>;

    /// First record matching `extra` with its id pinned to `id`.
    async fn get_by_id(&self, id: Uuid, extra: &Criteria<R::Field>) -> Result<Option<R>, StoreError> {
        let criteria = extra.clone().with(R::ID_FIELD, id);
        Ok(self.get_by_criteria(&criteria).await?.into_iter().next())
    }
}

/// Process-local store backed by an insertion-ordered vector.
pub struct MemoryStore<R> {
    records: RwLock<Vec<R>>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> Store<R> for MemoryStore<R> {
    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(StoreError::Duplicate(record.id()));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn get_by_criteria(&self, criteria: &Criteria<R::Field>) -> Result<Vec<R>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records
            .iter()
            .filter(|record| matches(*record, criteria))
            .cloned()
            .collect())
    }

    async fn upsert(&self, mut record: R, at: DateTime<Utc>) -> Result<R, StoreError> {
        record.touch(at);

        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        match records.iter_mut().find(|existing| existing.id() == record.id()) {
            Some(slot) => *slot = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(record)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let before = records.len();
        records.retain(|record| record.id() != id);
        Ok(records.len() != before)
    }
}
