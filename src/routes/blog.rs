use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};

use crate::{dto::blog_dto::BlogPostResponse, error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/blog/{slug}",
    params(("slug" = String, Path, description = "Blog post slug")),
    responses(
        (status = 200, description = "Published blog post", body = Json<BlogPostResponse>),
        (status = 404, description = "Not found or unpublished")
    )
)]
#[axum::debug_handler]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let post = state.blog_service.get_published(&slug).await?;
    Ok(Json(BlogPostResponse::from(post)))
}

#[utoipa::path(
    get,
    path = "/api/blog/{slug}/meta",
    params(("slug" = String, Path, description = "Blog post slug")),
    responses(
        (status = 200, description = "Page metadata with Article structured data", body = Json<serde_json::Value>),
        (status = 404, description = "Not found or unpublished")
    )
)]
#[axum::debug_handler]
pub async fn post_metadata(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let post = state.blog_service.get_published(&slug).await?;
    Ok(Json(state.seo_service.blog_metadata(&post)))
}
