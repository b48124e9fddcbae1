//! Admin-only routes. Mounted behind `require_admin`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    dto::blog_dto::{BlogPostResponse, CreateBlogPostPayload},
    dto::category_dto::CategoryDistributionResponse,
    dto::posting_dto::{
        AdminPostingListQuery, CreatePostingPayload, PostingResponse, PurgeQuery, PurgeResponse,
        UpdatePostingPayload,
    },
    error::Result,
    models::lifecycle::Transition,
    routes::postings::{posting_response, summary_page},
    services::posting_service::Submitter,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/jobs",
    params(
        ("approved_only" = Option<bool>, Query, description = "Defaults to true; false includes pending postings"),
        ("include_deleted" = Option<bool>, Query, description = "Include soft-deleted postings when approved_only is false"),
        ("category" = Option<String>, Query, description = "Exact raw category label"),
        ("skip" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, at most 100")
    ),
    responses(
        (status = 200, description = "Postings", body = Json<serde_json::Value>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin")
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<AdminPostingListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.posting_service.list_admin(&query).await?;
    Ok(Json(summary_page(page)))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs",
    request_body = CreatePostingPayload,
    responses(
        (status = 201, description = "Posting created", body = Json<PostingResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<CreatePostingPayload>,
) -> Result<impl IntoResponse> {
    let posting = state
        .posting_service
        .create(payload, Submitter::Admin)
        .await?;
    Ok((StatusCode::CREATED, Json(posting_response(&state, posting))))
}

#[utoipa::path(
    get,
    path = "/api/admin/jobs/{id}",
    params(("id" = Uuid, Path, description = "Posting ID")),
    responses(
        (status = 200, description = "Posting in any lifecycle state", body = Json<PostingResponse>),
        (status = 404, description = "Posting not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    let posting = state.posting_service.get(id).await?;
    Ok(Json(posting_response(&state, posting)))
}

#[utoipa::path(
    patch,
    path = "/api/admin/jobs/{id}",
    params(("id" = Uuid, Path, description = "Posting ID")),
    request_body = UpdatePostingPayload,
    responses(
        (status = 200, description = "Posting updated; slug unchanged", body = Json<PostingResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Posting not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostingPayload>,
) -> Result<impl IntoResponse> {
    let posting = state.posting_service.update(id, payload).await?;
    Ok(Json(posting_response(&state, posting)))
}

async fn transition(state: &AppState, id: Uuid, transition: Transition) -> Result<PostingResponse> {
    let posting = state.lifecycle_service.transition(id, transition).await?;
    Ok(posting_response(state, posting))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs/{id}/approve",
    params(("id" = Uuid, Path, description = "Posting ID")),
    responses(
        (status = 200, description = "Posting approved", body = Json<PostingResponse>),
        (status = 404, description = "Posting not found"),
        (status = 409, description = "Posting is soft-deleted")
    )
)]
#[axum::debug_handler]
pub async fn approve_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    Ok(Json(transition(&state, id, Transition::Approve).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs/{id}/reject",
    params(("id" = Uuid, Path, description = "Posting ID")),
    responses(
        (status = 200, description = "Posting returned to pending", body = Json<PostingResponse>),
        (status = 404, description = "Posting not found"),
        (status = 409, description = "Posting is soft-deleted")
    )
)]
#[axum::debug_handler]
pub async fn reject_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    Ok(Json(transition(&state, id, Transition::Reject).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs/{id}/archive",
    params(("id" = Uuid, Path, description = "Posting ID")),
    responses(
        (status = 200, description = "Posting archived", body = Json<PostingResponse>),
        (status = 404, description = "Posting not found"),
        (status = 409, description = "Posting is soft-deleted")
    )
)]
#[axum::debug_handler]
pub async fn archive_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    Ok(Json(transition(&state, id, Transition::Archive).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs/{id}/unarchive",
    params(("id" = Uuid, Path, description = "Posting ID")),
    responses(
        (status = 200, description = "Posting unarchived", body = Json<PostingResponse>),
        (status = 404, description = "Posting not found"),
        (status = 409, description = "Posting is soft-deleted")
    )
)]
#[axum::debug_handler]
pub async fn unarchive_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    Ok(Json(transition(&state, id, Transition::Unarchive).await?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/jobs/{id}",
    params(("id" = Uuid, Path, description = "Posting ID")),
    responses(
        (status = 200, description = "Posting soft-deleted", body = Json<PostingResponse>),
        (status = 404, description = "Posting not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    Ok(Json(transition(&state, id, Transition::SoftDelete).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs/{id}/restore",
    params(("id" = Uuid, Path, description = "Posting ID")),
    responses(
        (status = 200, description = "Posting restored", body = Json<PostingResponse>),
        (status = 404, description = "Posting not found")
    )
)]
#[axum::debug_handler]
pub async fn restore_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse> {
    Ok(Json(transition(&state, id, Transition::Restore).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/jobs/{id}/regenerate-slug",
    params(("id" = Uuid, Path, description = "Posting ID")),
    responses(
        (status = 200, description = "Slug rebuilt from current fields; old URL stops resolving", body = Json<PostingResponse>),
        (status = 404, description = "Posting not found"),
        (status = 409, description = "Slug claimed concurrently")
    )
)]
#[axum::debug_handler]
pub async fn regenerate_slug(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let posting = state.posting_service.regenerate_slug(id).await?;
    Ok(Json(posting_response(&state, posting)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/jobs",
    params(("confirm" = bool, Query, description = "Must be true")),
    responses(
        (status = 200, description = "Every posting hard-deleted", body = Json<PurgeResponse>),
        (status = 400, description = "Missing confirmation")
    )
)]
#[axum::debug_handler]
pub async fn purge_jobs(
    State(state): State<AppState>,
    Query(query): Query<PurgeQuery>,
) -> Result<impl IntoResponse> {
    let removed = state.posting_service.purge_all(query.confirm).await?;
    Ok(Json(PurgeResponse { removed }))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories/distribution",
    responses(
        (status = 200, description = "Raw label frequencies over visible postings", body = Json<CategoryDistributionResponse>)
    )
)]
#[axum::debug_handler]
pub async fn category_distribution(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let labels = state.posting_service.label_distribution().await?;
    Ok(Json(CategoryDistributionResponse { labels }))
}

#[utoipa::path(
    post,
    path = "/api/admin/sitemap/regenerate",
    responses(
        (status = 200, description = "Sitemap regenerated and written", body = Json<serde_json::Value>),
        (status = 500, description = "Generation failed")
    )
)]
#[axum::debug_handler]
pub async fn regenerate_sitemap(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let xml = state.sitemap_service.regenerate().await?;
    let urls = xml.matches("<url>").count();
    Ok(Json(json!({ "status": "ok", "urls": urls })))
}

#[utoipa::path(
    post,
    path = "/api/admin/sweep",
    responses(
        (status = 200, description = "Expired postings archived", body = Json<serde_json::Value>)
    )
)]
#[axum::debug_handler]
pub async fn run_sweep(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let archived = state.expiry_sweeper().run_once().await?;
    Ok(Json(json!({ "archived": archived })))
}

#[utoipa::path(
    post,
    path = "/api/admin/blog",
    request_body = CreateBlogPostPayload,
    responses(
        (status = 201, description = "Blog post created", body = Json<BlogPostResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_blog_post(
    State(state): State<AppState>,
    Json(payload): Json<CreateBlogPostPayload>,
) -> Result<impl IntoResponse> {
    let post = state.blog_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(BlogPostResponse::from(post))))
}
