//! Shared application state

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::pagseguro::PagSeguroClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// PagSeguro REST client
    pub pagseguro: PagSeguroClient,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = db::connect(&config.database_path).await?;

        let pagseguro = PagSeguroClient::new(
            config.pagseguro_token.clone(),
            config.pagseguro_sandbox,
            config.notification_url.clone(),
        )?;

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            pagseguro,
        })
    }
}
