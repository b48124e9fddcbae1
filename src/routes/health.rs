use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::database::store::PostingFilter;
use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.count(&PostingFilter::public()).await {
        Ok(visible) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "site": state.config.site_name,
                "visible_postings": visible,
            })),
        ),
        Err(err) => {
            tracing::error!(error = %err, "Health check could not reach the store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "error": "store_unavailable" })),
            )
        }
    }
}
