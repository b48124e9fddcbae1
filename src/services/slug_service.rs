use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::database::store::{PostingStore, StoreError};
use crate::error::Result;
use crate::models::posting::Posting;

/// Upper bound on insert retries after a unique-index conflict. Each retry
/// re-resolves from a higher suffix, so this only trips under a pathological
/// stream of concurrent inserts racing for one base slug.
const MAX_INSERT_ATTEMPTS: u32 = 16;

#[derive(Clone)]
pub struct SlugService {
    store: Arc<dyn PostingStore>,
}

fn candidate(base: &str, suffix: u32) -> String {
    if suffix == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, suffix)
    }
}

impl SlugService {
    pub fn new(store: Arc<dyn PostingStore>) -> Self {
        Self { store }
    }

    /// First of `base`, `base-1`, `base-2`, ... not held by a posting other
    /// than `exclude`.
    pub async fn resolve(&self, base: &str, exclude: Uuid) -> Result<String> {
        self.resolve_from(base, exclude, 0).await.map(|(slug, _)| slug)
    }

    async fn resolve_from(&self, base: &str, exclude: Uuid, start: u32) -> Result<(String, u32)> {
        let mut suffix = start;
        loop {
            let slug = candidate(base, suffix);
            if !self.store.slug_taken(&slug, exclude).await? {
                return Ok((slug, suffix));
            }
            debug!(%slug, "slug taken, trying next suffix");
            suffix += 1;
        }
    }

    /// Resolves a slug for `posting` from `base` and inserts it. The pre-check
    /// can race with a concurrent insert; the store's unique constraint then
    /// rejects the write and the next suffix is tried.
    #[instrument(skip(self, posting), fields(id = %posting.id))]
    pub async fn insert_with_unique_slug(&self, posting: &mut Posting, base: &str) -> Result<()> {
        let mut start = 0;
        for _ in 0..MAX_INSERT_ATTEMPTS {
            let (slug, suffix) = self.resolve_from(base, posting.id, start).await?;
            posting.slug = Some(slug);
            match self.store.insert(posting).await {
                Ok(()) => return Ok(()),
                Err(StoreError::SlugConflict(conflict)) => {
                    tracing::warn!(%conflict, "slug claimed concurrently, retrying");
                    start = suffix + 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(StoreError::SlugConflict(base.to_string()).into())
    }
}
