use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    database::store::Page,
    dto::category_dto::CategoryJobsResponse,
    dto::posting_dto::{PageQuery, PostingSummary},
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Canonical categories with live job counts", body = Json<Vec<crate::dto::category_dto::CategoryListingResponse>>)
    )
)]
#[axum::debug_handler]
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.category_service.listings().await?))
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}",
    params(
        ("slug" = String, Path, description = "Canonical category slug"),
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100")
    ),
    responses(
        (status = 200, description = "Category listing and matching postings", body = Json<CategoryJobsResponse>),
        (status = 404, description = "Unknown category")
    )
)]
#[axum::debug_handler]
pub async fn category_jobs(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse> {
    let page = Page::new(query.skip, query.limit);
    let (category, postings) = state.category_service.category_jobs(&slug, page).await?;
    Ok(Json(CategoryJobsResponse {
        category,
        items: postings.into_iter().map(PostingSummary::from).collect(),
        skip: page.skip,
        limit: page.limit,
    }))
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}/meta",
    params(("slug" = String, Path, description = "Canonical category slug")),
    responses(
        (status = 200, description = "Category page metadata", body = Json<serde_json::Value>),
        (status = 404, description = "Unknown category")
    )
)]
#[axum::debug_handler]
pub async fn category_metadata(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let listing = state
        .category_service
        .listings()
        .await?
        .into_iter()
        .find(|l| l.slug == slug)
        .ok_or_else(|| Error::NotFound(format!("Unknown category: {}", slug)))?;
    Ok(Json(state.seo_service.category_metadata(&listing)))
}
