use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use devconnect_api::auth::{AppState, AppStateInner};
use devconnect_auth::token::{SigningKey, TokenService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devconnect=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("DEVCONNECT_DB_PATH").unwrap_or_else(|_| "devconnect.db".into());
    let host = std::env::var("DEVCONNECT_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("DEVCONNECT_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()?;

    // Init database
    let db = devconnect_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state. The signing key is per-process: a restart invalidates
    // every outstanding session token.
    let state: AppState = Arc::new(AppStateInner {
        db,
        tokens: TokenService::new(&SigningKey::generate()),
    });

    // Routes
    let app = devconnect_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("DevConnect server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
