use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::posting::Posting;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostingPayload {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub employment_type: Option<String>,
    #[serde(default)]
    pub categories: Vec<Option<String>>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub is_external: bool,
    pub external_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub application_deadline: Option<DateTime<Utc>>,
    /// Only honoured on the admin route.
    #[serde(default)]
    pub is_approved: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePostingPayload {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary_min: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub salary_max: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub employment_type: Option<Option<String>>,
    pub categories: Option<Vec<Option<String>>>,
    pub requirements: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub is_external: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub external_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub application_deadline: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingResponse {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub employment_type: Option<String>,
    pub categories: Vec<String>,
    pub canonical_categories: Vec<String>,
    pub requirements: Vec<String>,
    pub benefits: Vec<String>,
    pub is_external: bool,
    pub external_url: Option<String>,
    pub is_approved: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub is_expired: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub application_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PostingResponse {
    pub fn new(value: Posting, canonical_categories: Vec<&str>, now: DateTime<Utc>) -> Self {
        let slug = value.path_segment();
        let is_expired = value.is_expired(now);
        Self {
            id: value.id,
            slug,
            title: value.title,
            description: value.description,
            company: value.company,
            location: value.location,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            employment_type: value.employment_type,
            categories: value.categories,
            canonical_categories: canonical_categories.into_iter().map(String::from).collect(),
            requirements: value.requirements,
            benefits: value.benefits,
            is_external: value.is_external,
            external_url: value.external_url,
            is_approved: value.is_approved,
            is_deleted: value.is_deleted,
            deleted_at: value.deleted_at,
            is_archived: value.is_archived,
            is_expired,
            expires_at: value.expires_at,
            application_deadline: value.application_deadline,
            view_count: value.view_count,
            application_count: value.application_count,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary_min: Option<String>,
    pub salary_max: Option<String>,
    pub employment_type: Option<String>,
    pub categories: Vec<String>,
    pub is_archived: bool,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl From<Posting> for PostingSummary {
    fn from(value: Posting) -> Self {
        let trimmed = value.description.trim();
        let summary = if trimmed.chars().count() > 320 {
            format!("{}…", trimmed.chars().take(320).collect::<String>())
        } else {
            trimmed.to_string()
        };

        Self {
            slug: value.path_segment(),
            id: value.id,
            title: value.title,
            company: value.company,
            location: value.location,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            employment_type: value.employment_type,
            categories: value.categories,
            is_archived: value.is_archived,
            summary,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingListResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

/// Public listing. Only publicly visible postings are ever returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingListQuery {
    /// Exact match on a raw stored label; not resolved through the taxonomy.
    pub category: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminPostingListQuery {
    /// `false` also returns pending postings.
    pub approved_only: bool,
    /// Only consulted when `approved_only` is `false`.
    pub include_deleted: bool,
    pub category: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl Default for AdminPostingListQuery {
    fn default() -> Self {
        Self {
            approved_only: true,
            include_deleted: false,
            category: None,
            skip: None,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeQuery {
    pub confirm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub application_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub removed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_separates_absent_from_null() {
        let payload: UpdatePostingPayload =
            serde_json::from_str(r#"{"expires_at": null, "title": "Charge Nurse"}"#).unwrap();
        assert_eq!(payload.expires_at, Some(None));
        assert_eq!(payload.company, None);
        assert_eq!(payload.title.as_deref(), Some("Charge Nurse"));
    }

    #[test]
    fn admin_query_defaults_to_approved_only() {
        let query: AdminPostingListQuery = serde_json::from_str("{}").unwrap();
        assert!(query.approved_only);
        assert!(!query.include_deleted);
    }
}
