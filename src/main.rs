//! conecta-rural — marketplace HTTP server
//!
//! Long-running service that:
//! - Serves the marketplace API (catalog, addresses, accounts)
//! - Runs checkout: per-seller order splitting with atomic stock reservation
//! - Creates PagSeguro payment orders and receives gateway notifications
//! - Tracks order fulfillment status on behalf of sellers

use conecta_rural::api;
use conecta_rural::config::Config;
use conecta_rural::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conecta_rural=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting conecta-rural (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("conecta-rural listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
