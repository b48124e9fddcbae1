use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::posting_dto::{
        CreatePostingPayload, PostingListQuery, PostingListResponse, PostingResponse,
        PostingSummary,
    },
    error::Result,
    models::posting::Posting,
    services::posting_service::{PostingPage, Submitter},
    utils::time::now,
    AppState,
};

pub(crate) fn posting_response(state: &AppState, posting: Posting) -> PostingResponse {
    let canonical = state.posting_service.canonical_categories(&posting);
    PostingResponse::new(posting, canonical, now())
}

pub(crate) fn summary_page(page: PostingPage) -> PostingListResponse<PostingSummary> {
    PostingListResponse {
        items: page.items.into_iter().map(PostingSummary::from).collect(),
        total: page.total,
        skip: page.page.skip,
        limit: page.page.limit,
    }
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("category" = Option<String>, Query, description = "Exact raw category label"),
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100")
    ),
    responses(
        (status = 200, description = "Publicly visible postings", body = Json<serde_json::Value>)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<PostingListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.posting_service.list(&query).await?;
    Ok(Json(summary_page(page)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{slug}",
    params(
        ("slug" = String, Path, description = "Posting slug, or id for postings without one")
    ),
    responses(
        (status = 200, description = "Posting detail", body = Json<PostingResponse>),
        (status = 404, description = "Posting not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let posting = state.posting_service.record_view(&slug).await?;
    Ok(Json(posting_response(&state, posting)))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{slug}/apply",
    params(
        ("slug" = String, Path, description = "Posting slug or id")
    ),
    responses(
        (status = 200, description = "Application recorded", body = Json<crate::dto::posting_dto::ApplyResponse>),
        (status = 404, description = "Posting not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn apply_to_job(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let response = state.posting_service.apply(&slug).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{slug}/meta",
    params(
        ("slug" = String, Path, description = "Posting slug or id")
    ),
    responses(
        (status = 200, description = "Page metadata with JobPosting structured data", body = Json<serde_json::Value>),
        (status = 404, description = "Posting not found or not visible")
    )
)]
#[axum::debug_handler]
pub async fn job_metadata(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let posting = state.posting_service.find_public(&slug).await?;
    Ok(Json(state.seo_service.posting_metadata(&posting)))
}

#[utoipa::path(
    post,
    path = "/api/employer/jobs",
    request_body = CreatePostingPayload,
    responses(
        (status = 201, description = "Posting submitted for review", body = Json<PostingResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn submit_job(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostingPayload>,
) -> Result<impl IntoResponse> {
    let posting = state
        .posting_service
        .create(payload, Submitter::Employer)
        .await?;
    Ok((StatusCode::CREATED, Json(posting_response(&state, posting))))
}
