use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::AppState;

/// Always answers 200: on generation failure the last written sitemap, or a
/// static-pages document, is served instead.
#[utoipa::path(
    get,
    path = "/sitemap.xml",
    responses(
        (status = 200, description = "XML sitemap", content_type = "application/xml", body = String)
    )
)]
#[axum::debug_handler]
pub async fn sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let xml = state.sitemap_service.serve().await;
    ([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], xml)
}
