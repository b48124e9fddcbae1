//! Storage collaborator for postings and blog posts.
//!
//! The store is a plain document-style backend: filter queries, single-row
//! updates, counters and one grouping aggregate. It provides no multi-row
//! transactions; slug uniqueness is the only constraint it enforces.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::blog_post::BlogPost;
use crate::models::lifecycle::LifecycleFlags;
use crate::models::posting::{Counter, Posting};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique slug constraint rejected a write.
    #[error("slug already taken: {0}")]
    SlugConflict(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Unique indexes whose violation means the slug is held by another row.
pub const SLUG_CONSTRAINTS: &[&str] = &["postings_slug_key", "blog_posts_slug_key"];

impl StoreError {
    fn unique_violation(constraint: Option<&str>, message: &str) -> Self {
        match constraint {
            Some(name) if SLUG_CONSTRAINTS.contains(&name) => {
                StoreError::SlugConflict(name.to_string())
            }
            _ => StoreError::Backend(message.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::unique_violation(db_err.constraint(), &err.to_string());
            }
        }
        StoreError::Backend(err.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Approved and not deleted.
    #[default]
    Public,
    /// Anything not soft-deleted.
    Live,
    /// Every stored posting, including soft-deleted ones.
    Any,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingFilter {
    pub visibility: Visibility,
    /// Exact match against a raw stored label.
    pub category_label: Option<String>,
    pub archived: Option<bool>,
    /// `expires_at` unset or strictly after this instant.
    pub unexpired_at: Option<DateTime<Utc>>,
    /// `expires_at` set and at or before this instant.
    pub expired_by: Option<DateTime<Utc>>,
}

impl PostingFilter {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn sitemap_eligible(now: DateTime<Utc>) -> Self {
        Self {
            visibility: Visibility::Public,
            unexpired_at: Some(now),
            ..Self::default()
        }
    }

    /// Live postings past their expiry that the sweep has not archived yet.
    pub fn due_for_expiry(now: DateTime<Utc>) -> Self {
        Self {
            visibility: Visibility::Live,
            archived: Some(false),
            expired_by: Some(now),
            ..Self::default()
        }
    }

    pub fn matches(&self, posting: &Posting) -> bool {
        let visible = match self.visibility {
            Visibility::Public => posting.is_approved && !posting.is_deleted,
            Visibility::Live => !posting.is_deleted,
            Visibility::Any => true,
        };
        visible
            && self
                .category_label
                .as_ref()
                .map_or(true, |label| posting.categories.iter().any(|c| c == label))
            && self.archived.map_or(true, |a| posting.is_archived == a)
            && self
                .unexpired_at
                .map_or(true, |now| posting.expires_at.map_or(true, |at| at > now))
            && self
                .expired_by
                .map_or(true, |now| posting.expires_at.is_some_and(|at| at <= now))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            skip: skip.unwrap_or(0).max(0),
            limit: limit.unwrap_or(20).clamp(1, Self::MAX_LIMIT),
        }
    }
}

/// Field-level patch. `None` leaves a field untouched; `Some(None)` unsets an
/// optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingUpdate {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub salary_min: Option<Option<String>>,
    pub salary_max: Option<Option<String>>,
    pub employment_type: Option<Option<String>>,
    pub categories: Option<Vec<String>>,
    pub requirements: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub is_external: Option<bool>,
    pub external_url: Option<Option<String>>,
    pub is_approved: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_deleted: Option<bool>,
    pub deleted_at: Option<Option<DateTime<Utc>>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub application_deadline: Option<Option<DateTime<Utc>>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PostingUpdate {
    /// Writes only the lifecycle columns that differ between `before` and
    /// `after`, so concurrent transitions on other columns are not overwritten.
    pub fn lifecycle_change(before: LifecycleFlags, after: LifecycleFlags) -> Self {
        fn changed<T: PartialEq>(before: T, after: T) -> Option<T> {
            (before != after).then_some(after)
        }
        Self {
            is_approved: changed(before.is_approved, after.is_approved),
            is_archived: changed(before.is_archived, after.is_archived),
            is_deleted: changed(before.is_deleted, after.is_deleted),
            deleted_at: changed(before.deleted_at, after.deleted_at),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, posting: &mut Posting) {
        if let Some(slug) = &self.slug {
            posting.slug = Some(slug.clone());
        }
        if let Some(title) = &self.title {
            posting.title = title.clone();
        }
        if let Some(description) = &self.description {
            posting.description = description.clone();
        }
        if let Some(company) = &self.company {
            posting.company = company.clone();
        }
        if let Some(location) = &self.location {
            posting.location = location.clone();
        }
        if let Some(salary_min) = &self.salary_min {
            posting.salary_min = salary_min.clone();
        }
        if let Some(salary_max) = &self.salary_max {
            posting.salary_max = salary_max.clone();
        }
        if let Some(employment_type) = &self.employment_type {
            posting.employment_type = employment_type.clone();
        }
        if let Some(categories) = &self.categories {
            posting.categories = categories.clone();
        }
        if let Some(requirements) = &self.requirements {
            posting.requirements = requirements.clone();
        }
        if let Some(benefits) = &self.benefits {
            posting.benefits = benefits.clone();
        }
        if let Some(is_external) = self.is_external {
            posting.is_external = is_external;
        }
        if let Some(external_url) = &self.external_url {
            posting.external_url = external_url.clone();
        }
        if let Some(is_approved) = self.is_approved {
            posting.is_approved = is_approved;
        }
        if let Some(is_archived) = self.is_archived {
            posting.is_archived = is_archived;
        }
        if let Some(is_deleted) = self.is_deleted {
            posting.is_deleted = is_deleted;
        }
        if let Some(deleted_at) = self.deleted_at {
            posting.deleted_at = deleted_at;
        }
        if let Some(expires_at) = self.expires_at {
            posting.expires_at = expires_at;
        }
        if let Some(deadline) = self.application_deadline {
            posting.application_deadline = deadline;
        }
        if let Some(updated_at) = self.updated_at {
            posting.updated_at = Some(updated_at);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Fails with [`StoreError::SlugConflict`] when the slug is already held.
    async fn insert(&self, posting: &Posting) -> StoreResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Posting>>;

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Posting>>;

    /// Whether any posting other than `exclude` holds `slug`.
    async fn slug_taken(&self, slug: &str, exclude: Uuid) -> StoreResult<bool>;

    /// Ordered non-archived first, then newest first.
    async fn find(&self, filter: &PostingFilter, page: Option<Page>) -> StoreResult<Vec<Posting>>;

    async fn count(&self, filter: &PostingFilter) -> StoreResult<i64>;

    /// Returns the updated posting, or `None` when the id is unknown.
    async fn update(&self, id: Uuid, update: &PostingUpdate) -> StoreResult<Option<Posting>>;

    /// Returns false when the id is unknown.
    async fn increment(&self, id: Uuid, counter: Counter) -> StoreResult<bool>;

    /// Hard-deletes every posting and returns how many were removed.
    async fn purge_all(&self) -> StoreResult<u64>;

    /// Raw label frequencies over publicly visible postings.
    async fn label_distribution(&self) -> StoreResult<Vec<LabelCount>>;

    async fn insert_blog_post(&self, post: &BlogPost) -> StoreResult<()>;

    async fn find_blog_post_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>>;

    async fn blog_slug_taken(&self, slug: &str) -> StoreResult<bool>;

    async fn list_published_blog_posts(&self) -> StoreResult<Vec<BlogPost>>;
}
