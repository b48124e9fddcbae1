pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::store::PostingStore;
use crate::error::Result;
use crate::services::{
    blog_service::BlogService,
    category_service::CategoryService,
    lifecycle_service::LifecycleService,
    posting_service::PostingService,
    seo_service::SeoService,
    sitemap_service::{SitemapRegenerator, SitemapService},
    sweep_service::ExpirySweeper,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn PostingStore>,
    pub posting_service: PostingService,
    pub lifecycle_service: LifecycleService,
    pub category_service: CategoryService,
    pub seo_service: SeoService,
    pub sitemap_service: SitemapService,
    pub blog_service: BlogService,
}

impl AppState {
    /// Wires every service onto `store` and starts the sitemap regeneration
    /// worker. Must be called inside a Tokio runtime.
    pub fn new(store: Arc<dyn PostingStore>, config: Config) -> Result<Self> {
        let category_service = CategoryService::new(store.clone())?;
        let sitemap_service = SitemapService::new(
            store.clone(),
            category_service.categories().iter().map(|c| c.slug).collect(),
            config.site_url.clone(),
            config.sitemap_path.clone(),
        );
        let regenerator = SitemapRegenerator::spawn(sitemap_service.clone());

        let posting_service =
            PostingService::new(store.clone(), category_service.clone(), regenerator.clone());
        let lifecycle_service = LifecycleService::new(store.clone(), regenerator.clone());
        let blog_service = BlogService::new(store.clone(), regenerator);
        let seo_service = SeoService::new(config.site_url.clone(), config.site_name.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            posting_service,
            lifecycle_service,
            category_service,
            seo_service,
            sitemap_service,
            blog_service,
        })
    }

    pub fn expiry_sweeper(&self) -> ExpirySweeper {
        ExpirySweeper::new(self.lifecycle_service.clone(), self.config.sweep_retry_delay)
    }
}
