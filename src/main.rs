use dealer_portal_backend::{
    build_router,
    config::{init_config, LogFormat},
    database::pool::create_pool,
    AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = init_config()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    info!(?config, "configuration loaded");

    let pool = create_pool(config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool, config)?;
    if let Some(max_age) = app_state.verifier.max_age() {
        info!("Init data older than {}s will be rejected on /api", max_age.num_seconds());
    }

    tokio::fs::create_dir_all(&config.uploads_dir).await?;
    info!("Serving uploads from: {}", config.uploads_dir);

    let app = build_router(app_state, config);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
