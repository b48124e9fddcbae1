use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::database::store::{
    LabelCount, Page, PostingFilter, PostingStore, PostingUpdate, StoreError, Visibility,
};
use crate::dto::posting_dto::{
    AdminPostingListQuery, ApplyResponse, CreatePostingPayload, PostingListQuery,
    UpdatePostingPayload,
};
use crate::error::{Error, Result};
use crate::models::lifecycle::Lifecycle;
use crate::models::posting::{Counter, Posting};
use crate::services::category_service::CategoryService;
use crate::services::sitemap_service::SitemapRegenerator;
use crate::services::slug_service::SlugService;
use crate::utils::slug::posting_slug;
use crate::utils::time::now;
use crate::utils::validation::{non_blank, require_https_url};

/// Who submitted a new posting. Decides its initial moderation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitter {
    Employer,
    Admin,
}

#[derive(Debug, Clone)]
pub struct PostingPage {
    pub items: Vec<Posting>,
    pub total: i64,
    pub page: Page,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trimmed_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// External postings must carry an https application link.
fn check_external(is_external: bool, external_url: Option<&str>) -> Result<()> {
    match external_url {
        Some(url) => {
            require_https_url(url)?;
            Ok(())
        }
        None if is_external => Err(Error::BadRequest(
            "external_url is required for external postings".to_string(),
        )),
        None => Ok(()),
    }
}

#[derive(Clone)]
pub struct PostingService {
    store: Arc<dyn PostingStore>,
    slugs: SlugService,
    categories: CategoryService,
    regenerator: SitemapRegenerator,
}

impl PostingService {
    pub fn new(
        store: Arc<dyn PostingStore>,
        categories: CategoryService,
        regenerator: SitemapRegenerator,
    ) -> Self {
        Self {
            slugs: SlugService::new(store.clone()),
            store,
            categories,
            regenerator,
        }
    }

    #[instrument(skip(self, payload), fields(title = %payload.title))]
    pub async fn create(&self, payload: CreatePostingPayload, submitter: Submitter) -> Result<Posting> {
        payload.validate()?;
        non_blank("title", &payload.title)?;
        non_blank("description", &payload.description)?;
        let external_url = trimmed(payload.external_url);
        check_external(payload.is_external, external_url.as_deref())?;

        let lifecycle = match submitter {
            Submitter::Admin if payload.is_approved => Lifecycle::pre_approved(),
            Submitter::Admin | Submitter::Employer => Lifecycle::pending(),
        };

        let id = Uuid::new_v4();
        let company = trimmed(payload.company);
        let location = trimmed(payload.location);
        let mut posting = Posting {
            id,
            slug: None,
            title: payload.title.trim().to_string(),
            description: payload.description,
            company,
            location,
            salary_min: trimmed(payload.salary_min),
            salary_max: trimmed(payload.salary_max),
            employment_type: trimmed(payload.employment_type),
            categories: self.categories.normalize_labels(&payload.categories),
            requirements: trimmed_list(payload.requirements),
            benefits: trimmed_list(payload.benefits),
            is_external: payload.is_external,
            external_url,
            is_approved: false,
            is_deleted: false,
            deleted_at: None,
            is_archived: false,
            expires_at: payload.expires_at,
            application_deadline: payload.application_deadline,
            view_count: 0,
            application_count: 0,
            created_at: now(),
            updated_at: None,
        };
        posting.set_lifecycle(lifecycle);

        let base = posting_slug(
            &posting.title,
            posting.company.as_deref(),
            posting.location.as_deref(),
            &id.simple().to_string(),
        );
        self.slugs.insert_with_unique_slug(&mut posting, &base).await?;

        info!(id = %posting.id, slug = ?posting.slug, ?submitter, "Posting created");
        if posting.is_publicly_visible() {
            self.regenerator.request("posting_created");
        }
        Ok(posting)
    }

    /// Field edits. The slug is never touched, even when the title changes.
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: Uuid, payload: UpdatePostingPayload) -> Result<Posting> {
        payload.validate()?;
        let existing = self.get(id).await?;

        if let Some(title) = &payload.title {
            non_blank("title", title)?;
        }
        if let Some(description) = &payload.description {
            non_blank("description", description)?;
        }

        let update = PostingUpdate {
            title: payload.title.map(|t| t.trim().to_string()),
            description: payload.description,
            company: payload.company.map(trimmed),
            location: payload.location.map(trimmed),
            salary_min: payload.salary_min.map(trimmed),
            salary_max: payload.salary_max.map(trimmed),
            employment_type: payload.employment_type.map(trimmed),
            categories: payload
                .categories
                .map(|raw| self.categories.normalize_labels(&raw)),
            requirements: payload.requirements.map(trimmed_list),
            benefits: payload.benefits.map(trimmed_list),
            is_external: payload.is_external,
            external_url: payload.external_url.map(trimmed),
            expires_at: payload.expires_at,
            application_deadline: payload.application_deadline,
            updated_at: Some(now()),
            ..PostingUpdate::default()
        };

        let mut merged = existing;
        update.apply_to(&mut merged);
        check_external(merged.is_external, merged.external_url.as_deref())?;

        let updated = self
            .store
            .update(id, &update)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Posting {} not found", id)))?;
        info!(%id, "Posting updated");
        self.regenerator.request("posting_updated");
        Ok(updated)
    }

    /// Any stored posting, including deleted and unapproved ones.
    pub async fn get(&self, id: Uuid) -> Result<Posting> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Posting {} not found", id)))
    }

    /// Resolves a slug, falling back to the raw id for legacy postings. Hidden
    /// postings are reported as missing.
    pub async fn find_public(&self, slug_or_id: &str) -> Result<Posting> {
        let mut found = self.store.find_by_slug(slug_or_id).await?;
        if found.is_none() {
            if let Ok(id) = Uuid::parse_str(slug_or_id) {
                found = self.store.find_by_id(id).await?;
            }
        }
        found
            .filter(Posting::is_publicly_visible)
            .ok_or_else(|| Error::NotFound(format!("Job not found: {}", slug_or_id)))
    }

    pub async fn list(&self, query: &PostingListQuery) -> Result<PostingPage> {
        let filter = PostingFilter {
            category_label: query.category.clone(),
            ..PostingFilter::public()
        };
        self.page(&filter, Page::new(query.skip, query.limit)).await
    }

    pub async fn list_admin(&self, query: &AdminPostingListQuery) -> Result<PostingPage> {
        let visibility = match (query.approved_only, query.include_deleted) {
            (true, _) => Visibility::Public,
            (false, true) => Visibility::Any,
            (false, false) => Visibility::Live,
        };
        let filter = PostingFilter {
            visibility,
            category_label: query.category.clone(),
            ..PostingFilter::default()
        };
        self.page(&filter, Page::new(query.skip, query.limit)).await
    }

    async fn page(&self, filter: &PostingFilter, page: Page) -> Result<PostingPage> {
        let total = self.store.count(filter).await?;
        let items = self.store.find(filter, Some(page)).await?;
        Ok(PostingPage { items, total, page })
    }

    pub async fn record_view(&self, slug_or_id: &str) -> Result<Posting> {
        let mut posting = self.find_public(slug_or_id).await?;
        if self.store.increment(posting.id, Counter::Views).await? {
            posting.view_count += 1;
        }
        Ok(posting)
    }

    pub async fn apply(&self, slug_or_id: &str) -> Result<ApplyResponse> {
        let posting = self.find_public(slug_or_id).await?;
        let mut application_count = posting.application_count;
        if self.store.increment(posting.id, Counter::Applications).await? {
            application_count += 1;
        }
        Ok(ApplyResponse {
            application_count,
            redirect_url: posting.external_url.filter(|_| posting.is_external),
        })
    }

    /// Rebuilds the slug from the current title, company and location. Breaks
    /// every inbound link to the old URL.
    #[instrument(skip(self))]
    pub async fn regenerate_slug(&self, id: Uuid) -> Result<Posting> {
        let posting = self.get(id).await?;
        let base = posting_slug(
            &posting.title,
            posting.company.as_deref(),
            posting.location.as_deref(),
            &id.simple().to_string(),
        );
        let slug = self.slugs.resolve(&base, id).await?;
        if posting.slug.as_deref() == Some(slug.as_str()) {
            return Ok(posting);
        }

        warn!(
            %id,
            old = ?posting.slug,
            new = %slug,
            "Regenerating slug; links to the old URL will stop resolving"
        );
        let update = PostingUpdate {
            slug: Some(slug),
            updated_at: Some(now()),
            ..PostingUpdate::default()
        };
        let updated = match self.store.update(id, &update).await {
            Ok(found) => found.ok_or_else(|| Error::NotFound(format!("Posting {} not found", id)))?,
            Err(StoreError::SlugConflict(slug)) => {
                return Err(Error::Conflict(format!(
                    "Slug {} was claimed concurrently, retry the request",
                    slug
                )))
            }
            Err(err) => return Err(err.into()),
        };
        self.regenerator.request("slug_regenerated");
        Ok(updated)
    }

    /// Hard-deletes every posting. Requires explicit confirmation.
    #[instrument(skip(self))]
    pub async fn purge_all(&self, confirm: bool) -> Result<u64> {
        if !confirm {
            return Err(Error::BadRequest(
                "Purging all postings requires confirm=true".to_string(),
            ));
        }
        let removed = self.store.purge_all().await?;
        warn!(removed, "All postings purged");
        self.regenerator.request("purge");
        Ok(removed)
    }

    pub async fn label_distribution(&self) -> Result<Vec<LabelCount>> {
        Ok(self.store.label_distribution().await?)
    }

    pub fn canonical_categories(&self, posting: &Posting) -> Vec<&'static str> {
        self.categories.slugs_for_posting(posting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_store::MemoryStore;
    use crate::services::sitemap_service::SitemapService;

    fn service(store: Arc<MemoryStore>, dir: &tempfile::TempDir) -> PostingService {
        let categories = CategoryService::new(store.clone()).unwrap();
        let sitemap = SitemapService::new(
            store.clone(),
            Vec::new(),
            "https://jobs.example.org".into(),
            dir.path().join("sitemap.xml"),
        );
        PostingService::new(store, categories, SitemapRegenerator::spawn(sitemap))
    }

    fn payload(title: &str) -> CreatePostingPayload {
        CreatePostingPayload {
            title: title.to_string(),
            description: "Provide bedside care on a 30-bed unit.".to_string(),
            company: Some("Acme Health".to_string()),
            location: Some("Austin, TX".to_string()),
            salary_min: None,
            salary_max: None,
            employment_type: Some("Full-time".to_string()),
            categories: vec![Some("nurse".to_string()), None, Some(" ".to_string())],
            requirements: Vec::new(),
            benefits: Vec::new(),
            is_external: false,
            external_url: None,
            expires_at: None,
            application_deadline: None,
            is_approved: true,
        }
    }

    #[tokio::test]
    async fn employer_cannot_self_approve() {
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();
        let postings = service(store, &dir);

        let created = postings
            .create(payload("Senior Nurse"), Submitter::Employer)
            .await
            .unwrap();
        assert!(!created.is_approved);
        assert_eq!(created.categories, vec!["Nursing"]);
        let slug = created.slug.clone().unwrap();
        assert!(slug.starts_with("senior-nurse-job-at-acme-health-in-austin-tx-"));
        assert!(slug.ends_with(&created.id.simple().to_string()[..8]));

        let err = postings.find_public(&slug).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let admin = postings
            .create(payload("Senior Nurse"), Submitter::Admin)
            .await
            .unwrap();
        assert!(admin.is_approved);
        assert_eq!(postings.find_public(&admin.id.to_string()).await.unwrap().id, admin.id);
    }

    #[tokio::test]
    async fn external_postings_require_https() {
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();
        let postings = service(store, &dir);

        let mut missing = payload("Pharmacist");
        missing.is_external = true;
        assert!(matches!(
            postings.create(missing, Submitter::Admin).await,
            Err(Error::BadRequest(_))
        ));

        let mut plain = payload("Pharmacist");
        plain.is_external = true;
        plain.external_url = Some("http://careers.example.org/apply".into());
        assert!(matches!(
            postings.create(plain, Submitter::Admin).await,
            Err(Error::BadRequest(_))
        ));

        let mut good = payload("Pharmacist");
        good.is_external = true;
        good.external_url = Some("https://careers.example.org/apply".into());
        let created = postings.create(good, Submitter::Admin).await.unwrap();
        let applied = postings.apply(&created.path_segment()).await.unwrap();
        assert_eq!(applied.application_count, 1);
        assert_eq!(
            applied.redirect_url.as_deref(),
            Some("https://careers.example.org/apply")
        );
    }

    #[tokio::test]
    async fn title_edit_keeps_slug_until_regenerated() {
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();
        let postings = service(store, &dir);
        let created = postings
            .create(payload("Night Nurse"), Submitter::Admin)
            .await
            .unwrap();

        let edited = postings
            .update(
                created.id,
                UpdatePostingPayload {
                    title: Some("Day Nurse".into()),
                    ..UpdatePostingPayload::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.title, "Day Nurse");
        assert_eq!(edited.slug, created.slug);
        assert!(edited.updated_at.is_some());

        let regenerated = postings.regenerate_slug(created.id).await.unwrap();
        assert!(regenerated.slug.unwrap().starts_with("day-nurse-job-at-"));
    }

    #[tokio::test]
    async fn purge_requires_confirmation() {
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();
        let postings = service(store, &dir);
        postings
            .create(payload("Dentist"), Submitter::Admin)
            .await
            .unwrap();

        assert!(matches!(postings.purge_all(false).await, Err(Error::BadRequest(_))));
        assert_eq!(postings.purge_all(true).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn raw_category_filter_is_exact() {
        let store = Arc::new(MemoryStore::new());
        let dir = tempfile::tempdir().unwrap();
        let postings = service(store, &dir);
        let mut travel = payload("Travel RN");
        travel.categories = vec![Some("Travel".into())];
        postings.create(travel, Submitter::Admin).await.unwrap();

        let query = |category: &str| PostingListQuery {
            category: Some(category.to_string()),
            ..PostingListQuery::default()
        };
        assert_eq!(postings.list(&query("Travel")).await.unwrap().total, 1);
        assert_eq!(postings.list(&query("travel")).await.unwrap().total, 0);
    }
}
