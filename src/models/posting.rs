use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::lifecycle::{Lifecycle, LifecycleFlags};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Posting {
    pub id: Uuid,
    /// Assigned once at creation. Legacy rows may not carry one.
    pub slug: Option<String>,
    pub title: String,
    pub description: String,
    pub company: Option<String>,
    pub location: Option<String>,
    /// Free text so values like "Negotiable" survive.
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub employment_type: Option<String>,
    pub categories: Vec<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub is_external: bool,
    pub external_url: Option<String>,
    pub is_approved: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub application_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Applications,
}

impl Posting {
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_flags(
            LifecycleFlags {
                is_approved: self.is_approved,
                is_archived: self.is_archived,
                is_deleted: self.is_deleted,
                deleted_at: self.deleted_at,
            },
            self.updated_at.unwrap_or(self.created_at),
        )
    }

    pub fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        let flags = lifecycle.flags();
        self.is_approved = flags.is_approved;
        self.is_archived = flags.is_archived;
        self.is_deleted = flags.is_deleted;
        self.deleted_at = flags.deleted_at;
    }

    pub fn is_publicly_visible(&self) -> bool {
        self.lifecycle().is_publicly_visible()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn is_sitemap_eligible(&self, now: DateTime<Utc>) -> bool {
        self.lifecycle().is_sitemap_eligible(self.expires_at, now)
    }

    /// URL path component: the slug, or the raw id for legacy rows.
    pub fn path_segment(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.is_empty() => slug.clone(),
            _ => self.id.to_string(),
        }
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}
