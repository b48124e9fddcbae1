use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::blog_post::BlogPost;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBlogPostPayload {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub excerpt: Option<String>,
    #[validate(length(min = 1))]
    pub content: String,
    pub author: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogPostResponse {
    pub id: uuid::Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<BlogPost> for BlogPostResponse {
    fn from(value: BlogPost) -> Self {
        Self {
            id: value.id,
            slug: value.slug,
            title: value.title,
            excerpt: value.excerpt,
            content: value.content,
            author: value.author,
            is_published: value.is_published,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
