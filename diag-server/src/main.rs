//! diag-server entry point

use diag_server::{AppState, Config, create_router, db, utils::logger};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    logger::init_logger(config.log_level.as_deref(), config.log_dir.as_deref());

    tracing::info!("Starting diag-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    if config.seed_demo_data {
        db::seed::seed_demo_catalog(&state.pool).await?;
    }

    let app = create_router(state.clone());

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("diag-server HTTP listening on {http_addr}");

    // Periodic housekeeping (every 5 minutes): rate limiter windows and expired sessions
    let rate_limiter = state.rate_limiter.clone();
    let pool = state.pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
            match db::sessions::purge_expired(&pool, shared::util::now_millis()).await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(purged = n, "Expired sessions purged"),
                Err(e) => tracing::warn!("Session purge failed: {e}"),
            }
        }
    });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
