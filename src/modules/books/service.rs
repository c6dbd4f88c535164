//! Book Lifecycle Service: ownership-scoped, policy-checked book mutations.

use std::sync::Arc;

use chrono::Utc;
use shelf_authz::PolicyEngine;
use shelf_db::{Criteria, KeyedLocks, MemoryStore, Store, StoreError};
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    AuthoredBook, BookDraft, BookField, BookFilter, BookPatch, FieldViolation, Scope, StoredBook,
};

#[derive(Debug, Error)]
pub enum BookError {
    #[error("invalid book input")]
    Validation(Vec<FieldViolation>),

    #[error("book not found")]
    NotFound,

    #[error("a book titled {title:?} already exists for this author")]
    Conflict { title: String },

    #[error("book rejected by policy rule {rule}")]
    Forbidden { rule: String },

    #[error("book store failure")]
    Internal(#[source] StoreError),
}

impl From<StoreError> for BookError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "book store operation failed");
        BookError::Internal(e)
    }
}

pub struct BookService {
    store: Arc<dyn Store<StoredBook>>,
    policy: PolicyEngine<StoredBook>,
    locks: KeyedLocks<String>,
}

impl BookService {
    pub fn new(store: Arc<dyn Store<StoredBook>>, policy: PolicyEngine<StoredBook>) -> Self {
        Self {
            store,
            policy,
            locks: KeyedLocks::new(),
        }
    }

    pub fn in_memory(policy: PolicyEngine<StoredBook>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), policy)
    }

    /// Load fixed records, bypassing validation and policy.
    pub async fn seed(&self, books: Vec<StoredBook>) -> Result<usize, BookError> {
        let count = books.len();
        for book in books {
            self.store.insert(book).await?;
        }
        tracing::info!(count, "book store seeded");
        Ok(count)
    }

    pub async fn create(&self, draft: BookDraft, author_id: &str) -> Result<StoredBook, BookError> {
        draft.validate().map_err(BookError::Validation)?;

        let _guard = self.locks.lock(&author_id.to_string()).await;
        self.ensure_unique_title(author_id, &draft.title, None).await?;

        let book = StoredBook::create(
            AuthoredBook::new(draft, author_id),
            Uuid::new_v4(),
            Utc::now(),
        );
        self.admit(&book)?;

        let book = self.store.insert(book).await?;
        tracing::info!(book_id = %book.id, author_id, "book created");
        Ok(book)
    }

    /// Books visible in `scope` that also satisfy `filter`. The scope always
    /// wins over a filter on the same field.
    pub async fn find_many(
        &self,
        scope: &Scope,
        filter: &BookFilter,
    ) -> Result<Vec<StoredBook>, BookError> {
        let criteria = filter.criteria().merge(&scope.criteria());
        Ok(self.store.get_by_criteria(&criteria).await?)
    }

    pub async fn find_one(&self, id: Uuid, scope: &Scope) -> Result<StoredBook, BookError> {
        self.store
            .get_by_id(id, &scope.criteria())
            .await?
            .ok_or(BookError::NotFound)
    }

    pub async fn patch(
        &self,
        id: Uuid,
        patch: BookPatch,
        author_id: &str,
    ) -> Result<StoredBook, BookError> {
        patch.validate().map_err(BookError::Validation)?;

        let _guard = self.locks.lock(&author_id.to_string()).await;
        let mut candidate = self.owned(id, author_id).await?;
        if let Some(title) = &patch.title {
            self.ensure_unique_title(author_id, title, Some(id)).await?;
        }

        let now = Utc::now();
        candidate.apply_patch(patch, now);
        self.admit(&candidate)?;

        let book = self.store.upsert(candidate, now).await?;
        tracing::info!(book_id = %id, author_id, "book patched");
        Ok(book)
    }

    pub async fn replace(
        &self,
        id: Uuid,
        draft: BookDraft,
        author_id: &str,
    ) -> Result<StoredBook, BookError> {
        draft.validate().map_err(BookError::Validation)?;

        let _guard = self.locks.lock(&author_id.to_string()).await;
        let mut candidate = self.owned(id, author_id).await?;
        self.ensure_unique_title(author_id, &draft.title, Some(id)).await?;

        let now = Utc::now();
        candidate.apply_replacement(draft, now);
        self.admit(&candidate)?;

        let book = self.store.upsert(candidate, now).await?;
        tracing::info!(book_id = %id, author_id, "book replaced");
        Ok(book)
    }

    pub async fn delete(&self, id: Uuid, author_id: &str) -> Result<(), BookError> {
        let _guard = self.locks.lock(&author_id.to_string()).await;
        self.owned(id, author_id).await?;

        if !self.store.remove(id).await? {
            return Err(BookError::NotFound);
        }
        tracing::info!(book_id = %id, author_id, "book deleted");
        Ok(())
    }

    async fn owned(&self, id: Uuid, author_id: &str) -> Result<StoredBook, BookError> {
        self.find_one(id, &Scope::owner(author_id)).await
    }

    async fn ensure_unique_title(
        &self,
        author_id: &str,
        title: &str,
        except: Option<Uuid>,
    ) -> Result<(), BookError> {
        let criteria = Criteria::new()
            .with(BookField::AuthorId, author_id)
            .with(BookField::Title, title);
        let taken = self
            .store
            .get_by_criteria(&criteria)
            .await?
            .iter()
            .any(|book| Some(book.id) != except);

        if taken {
            tracing::debug!(author_id, title, "duplicate title rejected");
            return Err(BookError::Conflict {
                title: title.to_string(),
            });
        }
        Ok(())
    }

    fn admit(&self, candidate: &StoredBook) -> Result<(), BookError> {
        match self.policy.violation(candidate) {
            Some(rule) => {
                tracing::warn!(
                    book_id = %candidate.id,
                    author_id = %candidate.author_id,
                    rule = rule.name(),
                    "book rejected by policy"
                );
                Err(BookError::Forbidden {
                    rule: rule.name().to_string(),
                })
            }
            None => Ok(()),
        }
    }
}
