use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::database::store::{PostingFilter, PostingStore, PostingUpdate};
use crate::error::{Error, Result};
use crate::models::lifecycle::Transition;
use crate::models::posting::Posting;
use crate::services::sitemap_service::SitemapRegenerator;
use crate::utils::time::now;

/// Applies moderation and lifecycle transitions to stored postings and keeps
/// the sitemap in step with them.
#[derive(Clone)]
pub struct LifecycleService {
    store: Arc<dyn PostingStore>,
    regenerator: SitemapRegenerator,
}

impl LifecycleService {
    pub fn new(store: Arc<dyn PostingStore>, regenerator: SitemapRegenerator) -> Self {
        Self { store, regenerator }
    }

    #[instrument(skip(self))]
    pub async fn transition(&self, id: Uuid, transition: Transition) -> Result<Posting> {
        let posting = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Posting {} not found", id)))?;

        let at = now();
        let current = posting.lifecycle();
        let next = current
            .apply(transition, at)
            .map_err(|e| Error::Conflict(e.to_string()))?;
        if next == current {
            debug!(%id, "transition is a no-op");
            return Ok(posting);
        }

        let update = PostingUpdate {
            updated_at: Some(at),
            ..PostingUpdate::lifecycle_change(current.flags(), next.flags())
        };
        let updated = self
            .store
            .update(id, &update)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Posting {} not found", id)))?;

        info!(%id, "Posting {}", transition.as_str());
        self.regenerator.request(transition.as_str());
        Ok(updated)
    }

    pub async fn approve(&self, id: Uuid) -> Result<Posting> {
        self.transition(id, Transition::Approve).await
    }

    pub async fn reject(&self, id: Uuid) -> Result<Posting> {
        self.transition(id, Transition::Reject).await
    }

    pub async fn archive(&self, id: Uuid) -> Result<Posting> {
        self.transition(id, Transition::Archive).await
    }

    pub async fn unarchive(&self, id: Uuid) -> Result<Posting> {
        self.transition(id, Transition::Unarchive).await
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<Posting> {
        self.transition(id, Transition::SoftDelete).await
    }

    pub async fn restore(&self, id: Uuid) -> Result<Posting> {
        self.transition(id, Transition::Restore).await
    }

    /// Archives every live posting whose `expires_at` is at or before `now`.
    /// Returns how many were archived by this run.
    #[instrument(skip(self))]
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let due = self
            .store
            .find(&PostingFilter::due_for_expiry(now), None)
            .await?;

        let mut archived = 0;
        for posting in due {
            let current = posting.lifecycle();
            let next = current.expire();
            if next == current {
                continue;
            }
            let update = PostingUpdate {
                updated_at: Some(now),
                ..PostingUpdate::lifecycle_change(current.flags(), next.flags())
            };
            match self.store.update(posting.id, &update).await? {
                Some(_) => archived += 1,
                None => warn!(id = %posting.id, "Posting vanished during expiry sweep"),
            }
        }

        if archived > 0 {
            info!(archived, "Archived expired postings");
            self.regenerator.request("expiry_sweep");
        }
        Ok(archived)
    }
}
