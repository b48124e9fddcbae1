use std::net::SocketAddr;
use std::sync::Arc;

use job_board_backend::{
    config::{get_config, init_config},
    database::{memory_store::MemoryStore, pg_store::PgStore, pool::create_pool, store::PostingStore},
    routes::build_router,
    services::sweep_service::start_sweep_scheduler,
    AppState,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    init_config()?;
    let config = get_config()?;

    let store: Arc<dyn PostingStore> = if config.database_url == "memory" {
        warn!("DATABASE_URL=memory: postings live in process memory and are lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pool = create_pool(&config.database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Arc::new(PgStore::new(pool))
    };

    let app_state = AppState::new(store, config.clone())?;

    match app_state.sitemap_service.regenerate().await {
        Ok(_) => info!("Initial sitemap written"),
        Err(e) => warn!(error = %e, "Initial sitemap generation failed"),
    }

    let _scheduler = if config.sweep_enabled {
        Some(start_sweep_scheduler(app_state.expiry_sweeper()).await?)
    } else {
        warn!("Expiry sweep disabled; expired postings stay unarchived");
        None
    };

    let app = build_router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
