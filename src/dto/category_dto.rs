use serde::{Deserialize, Serialize};

use crate::dto::posting_dto::PostingSummary;
use crate::database::store::LabelCount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryListingResponse {
    pub slug: String,
    pub name: String,
    pub job_count: i64,
    pub seo_title: String,
    pub meta_description: String,
    pub h1: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryJobsResponse {
    pub category: CategoryListingResponse,
    pub items: Vec<PostingSummary>,
    pub skip: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryDistributionResponse {
    pub labels: Vec<LabelCount>,
}
