use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::database::store::{PostingStore, StoreError};
use crate::dto::blog_dto::CreateBlogPostPayload;
use crate::error::{Error, Result};
use crate::models::blog_post::BlogPost;
use crate::services::sitemap_service::SitemapRegenerator;
use crate::utils::slug::slugify;
use crate::utils::time::now;
use crate::utils::validation::non_blank;

const MAX_INSERT_ATTEMPTS: u32 = 8;

#[derive(Clone)]
pub struct BlogService {
    store: Arc<dyn PostingStore>,
    regenerator: SitemapRegenerator,
}

impl BlogService {
    pub fn new(store: Arc<dyn PostingStore>, regenerator: SitemapRegenerator) -> Self {
        Self { store, regenerator }
    }

    async fn free_slug(&self, base: &str, start: u32) -> Result<(String, u32)> {
        let mut suffix = start;
        loop {
            let slug = if suffix == 0 {
                base.to_string()
            } else {
                format!("{}-{}", base, suffix)
            };
            if !self.store.blog_slug_taken(&slug).await? {
                return Ok((slug, suffix));
            }
            suffix += 1;
        }
    }

    #[instrument(skip(self, payload), fields(title = %payload.title))]
    pub async fn create(&self, payload: CreateBlogPostPayload) -> Result<BlogPost> {
        payload.validate()?;
        non_blank("title", &payload.title)?;
        non_blank("content", &payload.content)?;

        let id = Uuid::new_v4();
        let base = match slugify(&payload.title) {
            s if s.is_empty() => format!("post-{}", &id.simple().to_string()[..8]),
            s => s,
        };
        let mut post = BlogPost {
            id,
            slug: String::new(),
            title: payload.title.trim().to_string(),
            excerpt: payload
                .excerpt
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            content: payload.content,
            author: payload
                .author
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            is_published: payload.is_published,
            created_at: now(),
            updated_at: None,
        };

        let mut start = 0;
        for _ in 0..MAX_INSERT_ATTEMPTS {
            let (slug, suffix) = self.free_slug(&base, start).await?;
            post.slug = slug;
            match self.store.insert_blog_post(&post).await {
                Ok(()) => {
                    info!(id = %post.id, slug = %post.slug, "Blog post created");
                    if post.is_published {
                        self.regenerator.request("blog_post_created");
                    }
                    return Ok(post);
                }
                Err(StoreError::SlugConflict(conflict)) => {
                    warn!(%conflict, "blog slug claimed concurrently, retrying");
                    start = suffix + 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(StoreError::SlugConflict(base).into())
    }

    pub async fn get_published(&self, slug: &str) -> Result<BlogPost> {
        self.store
            .find_blog_post_by_slug(slug)
            .await?
            .filter(|p| p.is_published)
            .ok_or_else(|| Error::NotFound(format!("Blog post not found: {}", slug)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_store::MemoryStore;
    use crate::services::sitemap_service::SitemapService;

    fn service(store: Arc<MemoryStore>, dir: &tempfile::TempDir) -> BlogService {
        let sitemap = SitemapService::new(
            store.clone(),
            Vec::new(),
            "https://jobs.example.org".into(),
            dir.path().join("sitemap.xml"),
        );
        BlogService::new(store, SitemapRegenerator::spawn(sitemap))
    }

    fn payload(title: &str, is_published: bool) -> CreateBlogPostPayload {
        CreateBlogPostPayload {
            title: title.to_string(),
            excerpt: None,
            content: "Travel nursing demand keeps climbing.".to_string(),
            author: Some("Editorial Team".to_string()),
            is_published,
        }
    }

    #[tokio::test]
    async fn duplicate_titles_get_numbered_slugs() {
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();
        let blog = service(store, &dir);

        let first = blog.create(payload("Nursing Trends 2026", true)).await.unwrap();
        let second = blog.create(payload("Nursing Trends 2026", true)).await.unwrap();
        assert_eq!(first.slug, "nursing-trends-2026");
        assert_eq!(second.slug, "nursing-trends-2026-1");
    }

    #[tokio::test]
    async fn drafts_are_not_served() {
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();
        let blog = service(store, &dir);

        let draft = blog.create(payload("Upcoming Guide", false)).await.unwrap();
        assert!(matches!(
            blog.get_published(&draft.slug).await,
            Err(Error::NotFound(_))
        ));
    }
}
