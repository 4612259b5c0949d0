use tracing_subscriber::EnvFilter;

use therapytrack::api::router::api_router;
use therapytrack::config;
use therapytrack::db::Database;
use therapytrack::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config::default_log_filter()))
        .init();

    let db_path = config::database_path();
    tracing::info!(
        version = config::APP_VERSION,
        db = %db_path.display(),
        "starting {}",
        config::APP_NAME
    );

    let db = Database::open(&db_path)?;
    let app = api_router(AppState::new(db));

    let addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
