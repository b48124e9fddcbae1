pub mod admin;
pub mod blog;
pub mod categories;
pub mod health;
pub mod postings;
pub mod seo;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    auth::{require_admin, require_employer},
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::AppState;

/// Full HTTP surface: public pages, employer submission and the admin API,
/// each group behind its own rate limiter.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let public_api = Router::new()
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/api/jobs", get(postings::list_jobs))
        .route("/api/jobs/:slug", get(postings::get_job))
        .route("/api/jobs/:slug/apply", post(postings::apply_to_job))
        .route("/api/jobs/:slug/meta", get(postings::job_metadata))
        .route("/api/categories", get(categories::list_categories))
        .route("/api/categories/:slug", get(categories::category_jobs))
        .route("/api/categories/:slug/meta", get(categories::category_metadata))
        .route("/api/blog/:slug", get(blog::get_post))
        .route("/api/blog/:slug/meta", get(blog::post_metadata))
        .layer(from_fn_with_state(
            RateLimiter::new(config.public_rps),
            rps_middleware,
        ));

    let employer_api = Router::new()
        .route("/api/employer/jobs", post(postings::submit_job))
        .layer(from_fn_with_state(state.clone(), require_employer))
        .layer(from_fn_with_state(
            RateLimiter::new(config.public_rps),
            rps_middleware,
        ));

    let admin_api = Router::new()
        .route(
            "/api/admin/jobs",
            get(admin::list_jobs)
                .post(admin::create_job)
                .delete(admin::purge_jobs),
        )
        .route(
            "/api/admin/jobs/:id",
            get(admin::get_job)
                .patch(admin::update_job)
                .delete(admin::delete_job),
        )
        .route("/api/admin/jobs/:id/approve", post(admin::approve_job))
        .route("/api/admin/jobs/:id/reject", post(admin::reject_job))
        .route("/api/admin/jobs/:id/archive", post(admin::archive_job))
        .route("/api/admin/jobs/:id/unarchive", post(admin::unarchive_job))
        .route("/api/admin/jobs/:id/restore", post(admin::restore_job))
        .route(
            "/api/admin/jobs/:id/regenerate-slug",
            post(admin::regenerate_slug),
        )
        .route(
            "/api/admin/categories/distribution",
            get(admin::category_distribution),
        )
        .route("/api/admin/sitemap/regenerate", post(admin::regenerate_sitemap))
        .route("/api/admin/sweep", post(admin::run_sweep))
        .route("/api/admin/blog", post(admin::create_blog_post))
        .layer(from_fn_with_state(state.clone(), require_admin))
        .layer(from_fn_with_state(
            RateLimiter::new(config.admin_rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(public_api)
        .merge(employer_api)
        .merge(admin_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
