//! Sitemap generation.
//!
//! The document is rebuilt from scratch on every generation from the current
//! lifecycle state of every posting. Mutations enqueue a regeneration on
//! [`SitemapRegenerator`] and return immediately; the HTTP endpoint generates
//! synchronously and falls back to the last written artifact, then to a
//! static-pages-only document, so it never errors.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, instrument, warn};

use crate::database::store::{PostingFilter, PostingStore};
use crate::error::Result;
use crate::utils::time::{now, to_sitemap_date};

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// `(path, changefreq, priority)`
const STATIC_PAGES: &[(&str, &str, &str)] = &[
    ("/", "daily", "1.0"),
    ("/jobs", "hourly", "0.9"),
    ("/categories", "daily", "0.8"),
    ("/blog", "weekly", "0.7"),
    ("/employers", "monthly", "0.6"),
    ("/post-a-job", "monthly", "0.6"),
    ("/about", "monthly", "0.5"),
    ("/contact", "monthly", "0.5"),
    ("/privacy", "yearly", "0.3"),
    ("/terms", "yearly", "0.3"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{}\">", SITEMAP_NAMESPACE);
    for entry in entries {
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            escape_xml(&entry.loc),
            entry.lastmod,
            entry.changefreq,
            entry.priority
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

#[derive(Clone)]
pub struct SitemapService {
    store: Arc<dyn PostingStore>,
    category_slugs: Arc<Vec<&'static str>>,
    site_url: String,
    output_path: PathBuf,
}

impl SitemapService {
    pub fn new(
        store: Arc<dyn PostingStore>,
        category_slugs: Vec<&'static str>,
        site_url: String,
        output_path: PathBuf,
    ) -> Self {
        Self {
            store,
            category_slugs: Arc::new(category_slugs),
            site_url,
            output_path,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.site_url, path)
    }

    fn static_entries(&self, now: DateTime<Utc>) -> Vec<SitemapEntry> {
        let today = to_sitemap_date(now);
        STATIC_PAGES
            .iter()
            .map(|(path, changefreq, priority)| SitemapEntry {
                loc: self.url(path),
                lastmod: today.clone(),
                changefreq,
                priority,
            })
            .collect()
    }

    /// Static pages, category pages, every sitemap-eligible posting and every
    /// published blog post.
    pub async fn entries(&self, now: DateTime<Utc>) -> Result<Vec<SitemapEntry>> {
        let today = to_sitemap_date(now);
        let mut entries = self.static_entries(now);
        entries.extend(self.category_slugs.iter().map(|slug| SitemapEntry {
            loc: self.url(&format!("/jobs/category/{}", slug)),
            lastmod: today.clone(),
            changefreq: "daily",
            priority: "0.8",
        }));

        let postings = self
            .store
            .find(&PostingFilter::sitemap_eligible(now), None)
            .await?;
        entries.extend(postings.iter().map(|p| SitemapEntry {
            loc: self.url(&format!("/jobs/{}", p.path_segment())),
            lastmod: to_sitemap_date(p.last_modified()),
            changefreq: "weekly",
            priority: "0.7",
        }));

        let posts = self.store.list_published_blog_posts().await?;
        entries.extend(posts.iter().map(|p| SitemapEntry {
            loc: self.url(&format!("/blog/{}", p.slug)),
            lastmod: to_sitemap_date(p.last_modified()),
            changefreq: "monthly",
            priority: "0.6",
        }));

        Ok(entries)
    }

    pub async fn generate(&self, now: DateTime<Utc>) -> Result<String> {
        Ok(render(&self.entries(now).await?))
    }

    /// Minimal document used when neither generation nor the stored artifact
    /// is available.
    pub fn fallback_document(&self, now: DateTime<Utc>) -> String {
        render(&self.static_entries(now))
    }

    async fn persist(&self, xml: &str) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self
            .output_path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, xml).await?;
        tokio::fs::rename(&tmp, &self.output_path).await?;
        Ok(())
    }

    /// Regenerates and atomically replaces the stored artifact.
    #[instrument(skip(self))]
    pub async fn regenerate(&self) -> Result<String> {
        let xml = self.generate(now()).await?;
        self.persist(&xml).await?;
        info!(path = %self.output_path.display(), bytes = xml.len(), "Sitemap regenerated");
        Ok(xml)
    }

    /// On-demand path for the HTTP endpoint. Never fails.
    pub async fn serve(&self) -> String {
        match self.generate(now()).await {
            Ok(xml) => {
                if let Err(err) = self.persist(&xml).await {
                    warn!(error = %err, "Could not store freshly generated sitemap");
                }
                xml
            }
            Err(err) => {
                error!(error = %err, "Sitemap regeneration failed, serving last known good");
                match tokio::fs::read_to_string(&self.output_path).await {
                    Ok(previous) if !previous.trim().is_empty() => previous,
                    _ => {
                        warn!("No stored sitemap available, serving static fallback");
                        self.fallback_document(now())
                    }
                }
            }
        }
    }
}

/// Fire-and-forget regeneration queue.
///
/// Capacity is one: a request made while another is already queued is
/// absorbed by it, since the queued run reads state at execution time.
#[derive(Clone)]
pub struct SitemapRegenerator {
    tx: mpsc::Sender<&'static str>,
}

impl SitemapRegenerator {
    /// Spawns the worker task. Must be called inside a Tokio runtime.
    pub fn spawn(service: SitemapService) -> Self {
        let (tx, mut rx) = mpsc::channel::<&'static str>(1);
        tokio::spawn(async move {
            while let Some(reason) = rx.recv().await {
                if let Err(err) = service.regenerate().await {
                    error!(error = %err, reason, "Background sitemap regeneration failed");
                }
            }
            debug!("Sitemap regeneration worker stopped");
        });
        Self { tx }
    }

    pub fn request(&self, reason: &'static str) {
        match self.tx.try_send(reason) {
            Ok(()) => debug!(reason, "Sitemap regeneration queued"),
            Err(TrySendError::Full(_)) => debug!(reason, "Sitemap regeneration already pending"),
            Err(TrySendError::Closed(_)) => {
                warn!(reason, "Sitemap regeneration worker is gone, skipping")
            }
        }
    }
}
