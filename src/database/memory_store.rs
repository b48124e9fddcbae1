//! In-process store for tests and database-less local runs.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::database::store::{
    LabelCount, Page, PostingFilter, PostingStore, PostingUpdate, StoreError, StoreResult,
};
use crate::models::blog_post::BlogPost;
use crate::models::posting::{Counter, Posting};

#[derive(Default)]
pub struct MemoryStore {
    postings: RwLock<HashMap<Uuid, Posting>>,
    blog_posts: RwLock<HashMap<Uuid, BlogPost>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
        lock.read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {}", e)))
    }

    fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
        lock.write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {}", e)))
    }

    fn slug_held(postings: &HashMap<Uuid, Posting>, slug: &str, exclude: Uuid) -> bool {
        postings
            .values()
            .any(|p| p.id != exclude && p.slug.as_deref() == Some(slug))
    }
}

#[async_trait]
impl PostingStore for MemoryStore {
    async fn insert(&self, posting: &Posting) -> StoreResult<()> {
        let mut postings = Self::write(&self.postings)?;
        if let Some(slug) = posting.slug.as_deref() {
            if Self::slug_held(&postings, slug, posting.id) {
                return Err(StoreError::SlugConflict(slug.to_string()));
            }
        }
        postings.insert(posting.id, posting.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Posting>> {
        Ok(Self::read(&self.postings)?.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Posting>> {
        Ok(Self::read(&self.postings)?
            .values()
            .find(|p| p.slug.as_deref() == Some(slug))
            .cloned())
    }

    async fn slug_taken(&self, slug: &str, exclude: Uuid) -> StoreResult<bool> {
        let postings = Self::read(&self.postings)?;
        Ok(Self::slug_held(&postings, slug, exclude))
    }

    async fn find(&self, filter: &PostingFilter, page: Option<Page>) -> StoreResult<Vec<Posting>> {
        let postings = Self::read(&self.postings)?;
        let mut items: Vec<Posting> = postings
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.is_archived
                .cmp(&b.is_archived)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(page) = page {
            items = items
                .into_iter()
                .skip(page.skip as usize)
                .take(page.limit as usize)
                .collect();
        }
        Ok(items)
    }

    async fn count(&self, filter: &PostingFilter) -> StoreResult<i64> {
        let postings = Self::read(&self.postings)?;
        Ok(postings.values().filter(|p| filter.matches(p)).count() as i64)
    }

    async fn update(&self, id: Uuid, update: &PostingUpdate) -> StoreResult<Option<Posting>> {
        let mut postings = Self::write(&self.postings)?;
        if let Some(slug) = update.slug.as_deref() {
            if Self::slug_held(&postings, slug, id) {
                return Err(StoreError::SlugConflict(slug.to_string()));
            }
        }
        let Some(posting) = postings.get_mut(&id) else {
            return Ok(None);
        };
        update.apply_to(posting);
        Ok(Some(posting.clone()))
    }

    async fn increment(&self, id: Uuid, counter: Counter) -> StoreResult<bool> {
        let mut postings = Self::write(&self.postings)?;
        let Some(posting) = postings.get_mut(&id) else {
            return Ok(false);
        };
        match counter {
            Counter::Views => posting.view_count += 1,
            Counter::Applications => posting.application_count += 1,
        }
        Ok(true)
    }

    async fn purge_all(&self) -> StoreResult<u64> {
        let mut postings = Self::write(&self.postings)?;
        let removed = postings.len() as u64;
        postings.clear();
        Ok(removed)
    }

    async fn label_distribution(&self) -> StoreResult<Vec<LabelCount>> {
        let postings = Self::read(&self.postings)?;
        let public = PostingFilter::public();
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for posting in postings.values().filter(|p| public.matches(p)) {
            for label in &posting.categories {
                *counts.entry(label.clone()).or_default() += 1;
            }
        }
        let mut out: Vec<LabelCount> = counts
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        Ok(out)
    }

    async fn insert_blog_post(&self, post: &BlogPost) -> StoreResult<()> {
        let mut posts = Self::write(&self.blog_posts)?;
        if posts.values().any(|p| p.slug == post.slug && p.id != post.id) {
            return Err(StoreError::SlugConflict(post.slug.clone()));
        }
        posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_blog_post_by_slug(&self, slug: &str) -> StoreResult<Option<BlogPost>> {
        Ok(Self::read(&self.blog_posts)?
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn blog_slug_taken(&self, slug: &str) -> StoreResult<bool> {
        Ok(Self::read(&self.blog_posts)?
            .values()
            .any(|p| p.slug == slug))
    }

    async fn list_published_blog_posts(&self) -> StoreResult<Vec<BlogPost>> {
        let mut posts: Vec<BlogPost> = Self::read(&self.blog_posts)?
            .values()
            .filter(|p| p.is_published)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::fixtures::posting;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn rejects_duplicate_slugs_on_insert() {
        let store = MemoryStore::new();
        let mut first = posting("Charge Nurse");
        first.slug = Some("charge-nurse".into());
        let mut second = posting("Charge Nurse");
        second.slug = Some("charge-nurse".into());

        store.insert(&first).await.unwrap();
        let err = store.insert(&second).await.unwrap_err();
        assert!(matches!(err, StoreError::SlugConflict(s) if s == "charge-nurse"));
        assert!(!store.slug_taken("charge-nurse", first.id).await.unwrap());
        assert!(store.slug_taken("charge-nurse", second.id).await.unwrap());
    }

    #[tokio::test]
    async fn orders_archived_after_live_then_newest_first() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let mut old = posting("Old");
        old.created_at = now - Duration::days(3);
        let mut archived_new = posting("Archived New");
        archived_new.created_at = now;
        archived_new.is_archived = true;
        let mut recent = posting("Recent");
        recent.created_at = now - Duration::days(1);
        for p in [&old, &archived_new, &recent] {
            store.insert(p).await.unwrap();
        }

        let titles: Vec<String> = store
            .find(&PostingFilter::public(), None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Recent", "Old", "Archived New"]);

        let page = store
            .find(&PostingFilter::public(), Some(Page::new(Some(1), Some(1))))
            .await
            .unwrap();
        assert_eq!(page[0].title, "Old");
    }

    #[tokio::test]
    async fn distribution_unwinds_labels_of_visible_postings() {
        let store = MemoryStore::new();
        let mut a = posting("A");
        a.categories = vec!["Nursing".into(), "Travel".into()];
        let mut b = posting("B");
        b.categories = vec!["Nursing".into()];
        let mut hidden = posting("C");
        hidden.categories = vec!["Pharmacy".into()];
        hidden.is_approved = false;
        for p in [&a, &b, &hidden] {
            store.insert(p).await.unwrap();
        }

        let dist = store.label_distribution().await.unwrap();
        assert_eq!(
            dist,
            vec![
                LabelCount { label: "Nursing".into(), count: 2 },
                LabelCount { label: "Travel".into(), count: 1 },
            ]
        );
    }
}
