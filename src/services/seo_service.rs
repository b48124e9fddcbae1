use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value as JsonValue};

use crate::dto::category_dto::CategoryListingResponse;
use crate::dto::seo_dto::{OpenGraphTags, PageMetadata, TwitterCard};
use crate::models::blog_post::BlogPost;
use crate::models::posting::Posting;

const DESCRIPTION_MAX: usize = 155;

/// Parses a free-form salary bound such as `"$85,000"` or `"92000.50"`.
/// Text like `"Negotiable"` or `"DOE"` yields `None`.
pub fn parse_salary(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(['$', '€', '£'])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    Decimal::from_str(&cleaned)
        .ok()
        .filter(|d| d.is_sign_positive() && !d.is_zero())
}

fn salary_number(value: Decimal) -> JsonValue {
    if value.fract().is_zero() {
        if let Some(whole) = value.to_i64() {
            return json!(whole);
        }
    }
    value.to_f64().map_or(JsonValue::Null, |f| json!(f))
}

/// schema.org `employmentType` vocabulary.
fn schema_employment_type(raw: &str) -> &'static str {
    let key: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    match key.as_str() {
        "fulltime" => "FULL_TIME",
        "parttime" => "PART_TIME",
        "contract" | "contractor" => "CONTRACTOR",
        "temporary" | "temp" => "TEMPORARY",
        "perdiem" => "PER_DIEM",
        "intern" | "internship" => "INTERN",
        "volunteer" => "VOLUNTEER",
        _ => "OTHER",
    }
}

fn summarize(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        return collapsed;
    }
    let cut: String = collapsed.chars().take(max - 1).collect();
    let cut = match cut.rfind(' ') {
        Some(idx) if idx > max / 2 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end_matches([',', '.', ';', ':']))
}

#[derive(Debug, Clone)]
pub struct SeoService {
    site_url: String,
    site_name: String,
}

impl SeoService {
    pub fn new(site_url: String, site_name: String) -> Self {
        Self {
            site_url,
            site_name,
        }
    }

    pub fn posting_url(&self, posting: &Posting) -> String {
        format!("{}/jobs/{}", self.site_url, posting.path_segment())
    }

    fn page(
        &self,
        title: String,
        description: String,
        canonical_url: String,
        og_type: &str,
        json_ld: Option<JsonValue>,
    ) -> PageMetadata {
        PageMetadata {
            open_graph: OpenGraphTags {
                title: title.clone(),
                description: description.clone(),
                url: canonical_url.clone(),
                og_type: og_type.to_string(),
                site_name: self.site_name.clone(),
            },
            twitter: TwitterCard {
                card: "summary".to_string(),
                title: title.clone(),
                description: description.clone(),
            },
            title,
            description,
            canonical_url,
            json_ld,
        }
    }

    pub fn posting_metadata(&self, posting: &Posting) -> PageMetadata {
        let mut title = posting.title.trim().to_string();
        if let Some(company) = posting.company.as_deref().filter(|c| !c.trim().is_empty()) {
            title.push_str(&format!(" at {}", company.trim()));
        }
        if let Some(location) = posting.location.as_deref().filter(|l| !l.trim().is_empty()) {
            title.push_str(&format!(" in {}", location.trim()));
        }
        let title = format!("{} | {}", title, self.site_name);

        let description = if posting.description.trim().is_empty() {
            format!("Apply for {} on {}.", posting.title.trim(), self.site_name)
        } else {
            summarize(&posting.description, DESCRIPTION_MAX)
        };

        self.page(
            title,
            description,
            self.posting_url(posting),
            "website",
            Some(self.job_posting_schema(posting)),
        )
    }

    /// schema.org `JobPosting` structured data.
    pub fn job_posting_schema(&self, posting: &Posting) -> JsonValue {
        let organization = posting
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.site_name.as_str());

        let mut schema = Map::new();
        schema.insert("@context".into(), json!("https://schema.org/"));
        schema.insert("@type".into(), json!("JobPosting"));
        schema.insert("title".into(), json!(posting.title));
        schema.insert("description".into(), json!(posting.description));
        schema.insert("datePosted".into(), json!(posting.created_at.to_rfc3339()));
        schema.insert("url".into(), json!(self.posting_url(posting)));
        schema.insert(
            "identifier".into(),
            json!({ "@type": "PropertyValue", "name": organization, "value": posting.id.to_string() }),
        );
        schema.insert(
            "hiringOrganization".into(),
            json!({ "@type": "Organization", "name": organization }),
        );
        if let Some(expires_at) = posting.expires_at {
            schema.insert("validThrough".into(), json!(expires_at.to_rfc3339()));
        }
        if let Some(kind) = posting.employment_type.as_deref().filter(|k| !k.trim().is_empty()) {
            schema.insert("employmentType".into(), json!(schema_employment_type(kind)));
        }
        if let Some(location) = posting.location.as_deref().filter(|l| !l.trim().is_empty()) {
            schema.insert(
                "jobLocation".into(),
                json!({
                    "@type": "Place",
                    "address": { "@type": "PostalAddress", "addressLocality": location.trim() }
                }),
            );
        }
        if let Some(salary) = self.base_salary(posting) {
            schema.insert("baseSalary".into(), salary);
        }
        JsonValue::Object(schema)
    }

    /// Present only when at least one bound parses as a number.
    fn base_salary(&self, posting: &Posting) -> Option<JsonValue> {
        let min = posting.salary_min.as_deref().and_then(parse_salary);
        let max = posting.salary_max.as_deref().and_then(parse_salary);
        if min.is_none() && max.is_none() {
            return None;
        }
        let mut value = Map::new();
        value.insert("@type".into(), json!("QuantitativeValue"));
        value.insert("unitText".into(), json!("YEAR"));
        match (min, max) {
            (Some(min), Some(max)) => {
                value.insert("minValue".into(), salary_number(min));
                value.insert("maxValue".into(), salary_number(max));
            }
            (Some(single), None) | (None, Some(single)) => {
                value.insert("value".into(), salary_number(single));
            }
            (None, None) => {}
        }
        Some(json!({
            "@type": "MonetaryAmount",
            "currency": "USD",
            "value": JsonValue::Object(value),
        }))
    }

    pub fn blog_metadata(&self, post: &BlogPost) -> PageMetadata {
        let canonical = format!("{}/blog/{}", self.site_url, post.slug);
        let description = post
            .excerpt
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .map(|e| summarize(e, DESCRIPTION_MAX))
            .unwrap_or_else(|| summarize(&post.content, DESCRIPTION_MAX));
        let mut article = json!({
            "@context": "https://schema.org/",
            "@type": "Article",
            "headline": post.title,
            "datePublished": post.created_at.to_rfc3339(),
            "dateModified": post.last_modified().to_rfc3339(),
            "mainEntityOfPage": canonical,
            "publisher": { "@type": "Organization", "name": self.site_name },
        });
        if let Some(author) = post.author.as_deref().filter(|a| !a.trim().is_empty()) {
            article["author"] = json!({ "@type": "Person", "name": author.trim() });
        }
        self.page(
            format!("{} | {}", post.title.trim(), self.site_name),
            description,
            canonical,
            "article",
            Some(article),
        )
    }

    pub fn category_metadata(&self, listing: &CategoryListingResponse) -> PageMetadata {
        self.page(
            format!("{} | {}", listing.seo_title, self.site_name),
            listing.meta_description.clone(),
            format!("{}/jobs/category/{}", self.site_url, listing.slug),
            "website",
            None,
        )
    }
}
