//! Canonical category taxonomy.
//!
//! A canonical category binds postings through one or both of:
//! - label synonyms matched against the posting's stored category labels;
//! - title keywords, for categories whose label data is unreliable.
//!
//! Membership is evaluated on demand for each request; nothing is cached or
//! denormalized between requests.

use std::collections::HashSet;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use tracing::instrument;

use crate::database::store::{Page, PostingFilter, PostingStore};
use crate::dto::category_dto::CategoryListingResponse;
use crate::error::{Error, Result};
use crate::models::posting::Posting;

pub trait CategoryMatcher: Send + Sync {
    fn matches(&self, posting: &Posting) -> bool;
}

/// Direct membership: any stored label equals a synonym, ignoring case and
/// surrounding whitespace.
pub struct LabelMatcher {
    synonyms: HashSet<String>,
}

impl LabelMatcher {
    pub fn new<'a>(synonyms: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            synonyms: synonyms.into_iter().map(label_key).collect(),
        }
    }

    pub fn matches_label(&self, label: &str) -> bool {
        self.synonyms.contains(&label_key(label))
    }
}

impl CategoryMatcher for LabelMatcher {
    fn matches(&self, posting: &Posting) -> bool {
        posting.categories.iter().any(|l| self.matches_label(l))
    }
}

/// Derived membership: the title contains one of the keywords, ignoring case.
pub struct KeywordMatcher {
    pattern: Regex,
}

impl KeywordMatcher {
    pub fn new(keywords: &[&str]) -> std::result::Result<Self, regex::Error> {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;
        Ok(Self { pattern })
    }
}

impl CategoryMatcher for KeywordMatcher {
    fn matches(&self, posting: &Posting) -> bool {
        self.pattern.is_match(&posting.title)
    }
}

pub struct AnyOf(pub Vec<Box<dyn CategoryMatcher>>);

impl CategoryMatcher for AnyOf {
    fn matches(&self, posting: &Posting) -> bool {
        self.0.iter().any(|m| m.matches(posting))
    }
}

fn label_key(label: &str) -> String {
    label.trim().to_lowercase()
}

struct CategoryDef {
    slug: &'static str,
    name: &'static str,
    /// Stored spelling every synonym is rewritten to on write.
    label: &'static str,
    synonyms: &'static [&'static str],
    keywords: &'static [&'static str],
    seo_title: &'static str,
    meta_description: &'static str,
    h1: &'static str,
}

const TAXONOMY: &[CategoryDef] = &[
    CategoryDef {
        slug: "nursing",
        name: "Nursing Jobs",
        label: "Nursing",
        synonyms: &["nurse", "nurses", "nursing jobs", "registered nurse", "registered nurses", "rn", "lpn"],
        keywords: &[],
        seo_title: "{Number} Nursing Jobs Hiring Now",
        meta_description: "Browse {number} open nursing jobs for RNs, LPNs and nurse practitioners at hospitals, clinics and agencies.",
        h1: "Nursing Jobs",
    },
    CategoryDef {
        slug: "physicians",
        name: "Physician Jobs",
        label: "Physicians",
        synonyms: &["physician", "doctor", "doctors", "md"],
        keywords: &[],
        seo_title: "{Number} Physician Jobs Hiring Now",
        meta_description: "Explore {number} physician and doctor openings across specialties and practice settings.",
        h1: "Physician Jobs",
    },
    CategoryDef {
        slug: "allied-health",
        name: "Allied Health Jobs",
        label: "Allied Health",
        synonyms: &["allied healthcare", "allied", "allied health jobs"],
        keywords: &[],
        seo_title: "{Number} Allied Health Jobs Hiring Now",
        meta_description: "Find {number} allied health roles for technologists, technicians and support professionals.",
        h1: "Allied Health Jobs",
    },
    CategoryDef {
        slug: "pharmacy",
        name: "Pharmacy Jobs",
        label: "Pharmacy",
        synonyms: &["pharmacist", "pharmacists", "pharmacy technician", "pharmacy technicians", "pharmacy jobs"],
        keywords: &[],
        seo_title: "{Number} Pharmacy Jobs Hiring Now",
        meta_description: "Browse {number} pharmacist and pharmacy technician jobs in retail, hospital and specialty pharmacy.",
        h1: "Pharmacy Jobs",
    },
    CategoryDef {
        slug: "dental",
        name: "Dental Jobs",
        label: "Dental",
        synonyms: &["dentist", "dentists", "dentistry", "dental hygienist", "dental hygienists"],
        keywords: &[],
        seo_title: "{Number} Dental Jobs Hiring Now",
        meta_description: "See {number} dental openings for dentists, hygienists and dental assistants.",
        h1: "Dental Jobs",
    },
    CategoryDef {
        slug: "mental-health",
        name: "Mental Health Jobs",
        label: "Mental Health",
        synonyms: &["behavioral health", "behavioural health", "psychiatry", "counseling", "counselling"],
        keywords: &[],
        seo_title: "{Number} Mental Health Jobs Hiring Now",
        meta_description: "Discover {number} mental and behavioral health positions for counselors, therapists and psychiatric staff.",
        h1: "Mental Health Jobs",
    },
    CategoryDef {
        slug: "therapy",
        name: "Therapy Jobs",
        label: "Therapists",
        synonyms: &["therapy", "therapist", "physical therapy", "occupational therapy", "speech therapy"],
        keywords: &[],
        seo_title: "{Number} Therapy Jobs Hiring Now",
        meta_description: "Browse {number} physical, occupational and speech therapy jobs.",
        h1: "Therapy Jobs",
    },
    CategoryDef {
        slug: "home-health",
        name: "Home Health Jobs",
        label: "Home Health",
        synonyms: &["home care", "homecare", "home health aide", "home health aides"],
        keywords: &[],
        seo_title: "{Number} Home Health Jobs Hiring Now",
        meta_description: "Find {number} home health and home care jobs near you.",
        h1: "Home Health Jobs",
    },
    CategoryDef {
        slug: "healthcare-administration",
        name: "Healthcare Administration Jobs",
        label: "Healthcare Administration",
        synonyms: &["administration", "admin", "medical administration", "health administration"],
        keywords: &[],
        seo_title: "{Number} Healthcare Administration Jobs Hiring Now",
        meta_description: "Explore {number} healthcare administration and management roles.",
        h1: "Healthcare Administration Jobs",
    },
    CategoryDef {
        slug: "non-clinical-jobs",
        name: "Non-Clinical Jobs",
        label: "Non-Clinical",
        synonyms: &["non clinical", "nonclinical", "non-clinical jobs"],
        keywords: &[
            "billing", "coding", "coder", "receptionist", "front desk", "scheduler",
            "coordinator", "administrator", "recruiter", "analyst", "clerk",
            "medical records", "customer service",
        ],
        seo_title: "{Number} Non-Clinical Healthcare Jobs",
        meta_description: "Browse {number} non-clinical healthcare jobs in billing, coding, scheduling and operations.",
        h1: "Non-Clinical Healthcare Jobs",
    },
    CategoryDef {
        slug: "remote-jobs",
        name: "Remote Healthcare Jobs",
        label: "Remote",
        synonyms: &["work from home", "telehealth"],
        keywords: &["remote", "telehealth", "telemedicine", "work from home", "virtual"],
        seo_title: "{Number} Remote Healthcare Jobs",
        meta_description: "Find {number} remote and telehealth healthcare jobs you can do from home.",
        h1: "Remote Healthcare Jobs",
    },
];

pub struct CanonicalCategory {
    pub slug: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    pub seo_title: &'static str,
    pub meta_description: &'static str,
    pub h1: &'static str,
    labels: LabelMatcher,
    matcher: Box<dyn CategoryMatcher>,
}

impl CanonicalCategory {
    fn from_def(def: &CategoryDef) -> std::result::Result<Self, regex::Error> {
        let synonyms = || def.synonyms.iter().copied().chain(std::iter::once(def.label));
        let mut matchers: Vec<Box<dyn CategoryMatcher>> = vec![Box::new(LabelMatcher::new(synonyms()))];
        if !def.keywords.is_empty() {
            matchers.push(Box::new(KeywordMatcher::new(def.keywords)?));
        }
        Ok(Self {
            slug: def.slug,
            name: def.name,
            label: def.label,
            seo_title: def.seo_title,
            meta_description: def.meta_description,
            h1: def.h1,
            labels: LabelMatcher::new(synonyms()),
            matcher: Box::new(AnyOf(matchers)),
        })
    }

    pub fn matches(&self, posting: &Posting) -> bool {
        self.matcher.matches(posting)
    }

    pub fn listing(&self, job_count: i64) -> CategoryListingResponse {
        CategoryListingResponse {
            slug: self.slug.to_string(),
            name: self.name.to_string(),
            job_count,
            seo_title: fill_count(self.seo_title, job_count),
            meta_description: fill_count(self.meta_description, job_count),
            h1: fill_count(self.h1, job_count),
        }
    }
}

pub fn fill_count(template: &str, count: i64) -> String {
    let count = count.to_string();
    template
        .replace("{Number}", &count)
        .replace("{number}", &count)
}

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn PostingStore>,
    categories: Arc<Vec<CanonicalCategory>>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn PostingStore>) -> Result<Self> {
        let categories = TAXONOMY
            .iter()
            .map(CanonicalCategory::from_def)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Internal(format!("invalid category keyword pattern: {}", e)))?;
        Ok(Self {
            store,
            categories: Arc::new(categories),
        })
    }

    pub fn categories(&self) -> &[CanonicalCategory] {
        &self.categories
    }

    pub fn get(&self, slug: &str) -> Option<&CanonicalCategory> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Drops null and blank labels, rewrites known variants to their canonical
    /// spelling and removes duplicates (ignoring case), keeping first-seen order.
    pub fn normalize_labels(&self, raw: &[Option<String>]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for label in raw.iter().flatten() {
            let trimmed = label.trim();
            if trimmed.is_empty() {
                continue;
            }
            let canonical = self
                .categories
                .iter()
                .find(|c| c.labels.matches_label(trimmed))
                .map(|c| c.label.to_string())
                .unwrap_or_else(|| trimmed.to_string());
            if seen.insert(label_key(&canonical)) {
                out.push(canonical);
            }
        }
        out
    }

    /// Every canonical slug the posting satisfies through either strategy.
    pub fn slugs_for_posting(&self, posting: &Posting) -> Vec<&'static str> {
        self.categories
            .iter()
            .filter(|c| c.matches(posting))
            .map(|c| c.slug)
            .collect()
    }

    /// All canonical categories with live counts over publicly visible postings.
    #[instrument(skip(self))]
    pub async fn listings(&self) -> Result<Vec<CategoryListingResponse>> {
        let postings = self.store.find(&PostingFilter::public(), None).await?;
        let memberships: Vec<Vec<&'static str>> =
            postings.iter().map(|p| self.slugs_for_posting(p)).collect();
        Ok(self
            .categories
            .iter()
            .map(|c| {
                let count = memberships.iter().filter(|m| m.contains(&c.slug)).count();
                c.listing(count as i64)
            })
            .collect())
    }

    /// One category's listing plus the requested page of its postings.
    #[instrument(skip(self))]
    pub async fn category_jobs(
        &self,
        slug: &str,
        page: Page,
    ) -> Result<(CategoryListingResponse, Vec<Posting>)> {
        let category = self
            .get(slug)
            .ok_or_else(|| Error::NotFound(format!("Unknown category: {}", slug)))?;
        let members: Vec<Posting> = self
            .store
            .find(&PostingFilter::public(), None)
            .await?
            .into_iter()
            .filter(|p| category.matches(p))
            .collect();
        let listing = category.listing(members.len() as i64);
        let items = members
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect();
        Ok((listing, items))
    }
}
