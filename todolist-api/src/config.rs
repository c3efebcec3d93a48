/// Configuration management for the API server
///
/// Configuration is read once from environment variables at startup and is
/// immutable afterwards.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters (required)
/// - `JWT_TTL_SECONDS`: Access token lifetime (default: 3600)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `APP_ENV`: `production` enables HSTS (default: development)
///
/// # Example
///
/// ```no_run
/// use todolist_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

/// Shortest signing secret accepted at startup
pub const MIN_SECRET_LEN: usize = 32;

/// Longest access token lifetime accepted at startup (one year)
pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in seconds
    pub ttl_seconds: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric variable does not parse, or `JWT_TTL_SECONDS` is not in
    ///   `1..=MAX_TTL_SECONDS`
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("API_HOST", "0.0.0.0");
        let port = var("API_PORT", "3000")
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let cors_origins = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = var("APP_ENV", "development").eq_ignore_ascii_case("production");

        let url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if secret.chars().count() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        let ttl_seconds = var("JWT_TTL_SECONDS", "3600")
            .parse::<i64>()
            .context("JWT_TTL_SECONDS must be an integer")?;

        if ttl_seconds <= 0 {
            anyhow::bail!("JWT_TTL_SECONDS must be positive");
        }
        if ttl_seconds > MAX_TTL_SECONDS {
            anyhow::bail!("JWT_TTL_SECONDS must be at most {} (one year)", MAX_TTL_SECONDS);
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            jwt: JwtConfig {
                secret,
                ttl_seconds,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin is allowed
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}
