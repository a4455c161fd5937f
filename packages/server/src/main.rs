use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::database::init_db;
use server::seed;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    let default_level = if config.server.is_development() {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    seed::ensure_indexes(&db).await?;
    if let Some(ref bootstrap) = config.auth.bootstrap_admin {
        seed::seed_bootstrap_admin(&db, bootstrap).await?;
    }

    let state = AppState::new(db, config.clone());

    let limiter = state.check_limiter.clone();
    let window = Duration::from_secs(config.rate_limit.window_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(window);
        loop {
            interval.tick().await;
            limiter.prune();
        }
    });

    let app = server::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(environment = %config.server.environment, "Server running at http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
