use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vsearch_web::config::Config;
use vsearch_web::db::SqlxDriver;
use vsearch_web::server::router::{AppState, app_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let addr = cfg.listen_addr()?;
    info!(
        listen_addr = %addr,
        engine = %cfg.database.engine,
        db_host = %cfg.database.host,
        database = %cfg.database.database,
        columns = %cfg.request_log.columns,
        login_key = cfg.basic.login_key.is_some(),
    );

    let state = AppState::new(Arc::new(SqlxDriver::new()), &cfg)?;
    if let Err(e) = state.store.init_schema().await {
        warn!(kind = %e.kind(), error = %e, "could not ensure the log table exists");
    }
    if cfg.basic.cookie_secret.is_none() {
        warn!("basic.cookie_secret not set; login cookies will not survive a restart");
    }

    let app = app_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
