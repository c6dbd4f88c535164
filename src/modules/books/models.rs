use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelf_db::{Criteria, Fields, Record, Value};
use uuid::Uuid;

/// Caller-supplied book content, used for creation and full replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookDraft {
    pub title: String,
    pub description: String,
    /// Price in minor currency units (cents)
    pub price: i64,
    pub cover_image: String,
    #[serde(default)]
    pub published: Option<bool>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

/// A draft bound to the identity that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredBook {
    pub draft: BookDraft,
    pub author_id: String,
}

impl AuthoredBook {
    pub fn new(draft: BookDraft, author_id: impl Into<String>) -> Self {
        Self {
            draft,
            author_id: author_id.into(),
        }
    }
}

/// A book as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBook {
    pub id: Uuid,
    pub author_id: String,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub cover_image: String,
    pub published: bool,
    #[serde(
        default,
        with = "ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub unpublished_at: Option<DateTime<Utc>>,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl StoredBook {
    /// First stored form of `authored`, created at `now`.
    pub fn create(authored: AuthoredBook, id: Uuid, now: DateTime<Utc>) -> Self {
        let AuthoredBook { draft, author_id } = authored;
        let published = draft.published.unwrap_or(false);

        Self {
            id,
            author_id,
            title: draft.title,
            description: draft.description,
            price: draft.price,
            cover_image: draft.cover_image,
            published,
            published_at: published.then_some(now),
            unpublished_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the fields present in `patch`.
    pub fn apply_patch(&mut self, patch: BookPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(cover_image) = patch.cover_image {
            self.cover_image = cover_image;
        }
        if let Some(published) = patch.published {
            self.set_published(published, now);
        }
    }

    /// Replace every caller-settable field. An absent `published` means
    /// unpublished, exactly as on creation.
    pub fn apply_replacement(&mut self, draft: BookDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.description = draft.description;
        self.price = draft.price;
        self.cover_image = draft.cover_image;
        self.set_published(draft.published.unwrap_or(false), now);
    }

    /// Record publish/unpublish edges. Only a change of state stamps a
    /// timestamp; the opposite timestamp is left as it was.
    fn set_published(&mut self, published: bool, now: DateTime<Utc>) {
        match (self.published, published) {
            (false, true) => self.published_at = Some(now),
            (true, false) => self.unpublished_at = Some(now),
            _ => {}
        }
        self.published = published;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BookField {
    Id,
    AuthorId,
    Title,
    Description,
    Price,
    CoverImage,
    Published,
}

impl Fields for StoredBook {
    type Field = BookField;

    fn field(&self, field: BookField) -> Option<Value> {
        Some(match field {
            BookField::Id => self.id.into(),
            BookField::AuthorId => self.author_id.clone().into(),
            BookField::Title => self.title.clone().into(),
            BookField::Description => self.description.clone().into(),
            BookField::Price => self.price.into(),
            BookField::CoverImage => self.cover_image.clone().into(),
            BookField::Published => self.published.into(),
        })
    }
}

impl Record for StoredBook {
    const ID_FIELD: BookField = BookField::Id;

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(at);
    }
}

/// Optional exact-match filters accepted by the listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookFilter {
    pub title: Option<String>,
    pub published: Option<bool>,
}

impl BookFilter {
    pub fn criteria(&self) -> Criteria<BookField> {
        let mut criteria = Criteria::new();
        if let Some(title) = &self.title {
            criteria = criteria.with(BookField::Title, title.clone());
        }
        if let Some(published) = self.published {
            criteria = criteria.with(BookField::Published, published);
        }
        criteria
    }
}

/// Whose books a read may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Only books owned by this identity.
    Owner(String),
    /// Only published books, regardless of owner.
    Public,
}

impl Scope {
    pub fn owner(author_id: impl Into<String>) -> Self {
        Scope::Owner(author_id.into())
    }

    pub fn criteria(&self) -> Criteria<BookField> {
        match self {
            Scope::Owner(author_id) => Criteria::new().with(BookField::AuthorId, author_id.clone()),
            Scope::Public => Criteria::new().with(BookField::Published, true),
        }
    }
}

/// A rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub error: &'static str,
}

impl FieldViolation {
    const fn new(field: &'static str, error: &'static str) -> Self {
        Self { field, error }
    }
}

fn check_title(title: &str, violations: &mut Vec<FieldViolation>) {
    if title.trim().is_empty() {
        violations.push(FieldViolation::new("title", "must not be empty"));
    }
}

fn check_price(price: i64, violations: &mut Vec<FieldViolation>) {
    if price < 0 {
        violations.push(FieldViolation::new("price", "must not be negative"));
    }
}

impl BookDraft {
    pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();
        check_title(&self.title, &mut violations);
        check_price(self.price, &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl BookPatch {
    pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();
        if let Some(title) = &self.title {
            check_title(title, &mut violations);
        }
        if let Some(price) = self.price {
            check_price(price, &mut violations);
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
