//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file path
    pub database_path: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// PagSeguro API bearer token
    pub pagseguro_token: String,
    /// Use the PagSeguro sandbox environment
    pub pagseguro_sandbox: bool,
    /// Public URL PagSeguro posts payment notifications to
    pub notification_url: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "conecta_rural.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            pagseguro_token: Self::require_secret("PAGSEGURO_TOKEN", &environment)?,
            pagseguro_sandbox: std::env::var("PAGSEGURO_ENV")
                .map(|v| v != "production")
                .unwrap_or(true),
            notification_url: std::env::var("PAGSEGURO_NOTIFICATION_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            environment,
        })
    }
}
