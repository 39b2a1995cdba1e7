//! API server configuration

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use trellis_shared_config::{
    get_env_or_default, get_required_env, CommonConfig, DatabaseConfig, Environment,
    GraphQLConfig,
};

/// Persistence backend behind the GraphQL API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// PostgreSQL through sqlx
    #[default]
    Postgres,
    /// In-process tables, lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other services
    pub common: CommonConfig,

    /// Server port (default: 8080)
    pub port: u16,

    /// Store backend (default: postgres)
    pub store_backend: StoreBackend,

    /// CORS allowed origins (optional, any origin when unset)
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode this requires an explicit `DATABASE_URL` and
    /// refuses the in-memory store. In development/staging mode sensible
    /// defaults are used for convenience.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str(&get_env_or_default("ENVIRONMENT", "development"))
            .unwrap_or_default();

        let store_backend = get_env_or_default("STORE_BACKEND", "postgres")
            .parse::<StoreBackend>()
            .map_err(|e| anyhow::anyhow!("Invalid STORE_BACKEND value: {}", e))?;

        if environment.is_production() {
            if store_backend == StoreBackend::Memory {
                bail!("STORE_BACKEND=memory is not allowed in production");
            }
            Self::validate_database_url()?;
        }

        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        Ok(Self {
            common,

            port: get_env_or_default("PORT", "8080")
                .parse()
                .context("Invalid PORT value")?,

            store_backend,

            cors_allowed_origins: env::var("CORS_ORIGINS").ok().map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
        })
    }

    /// Validate that DATABASE_URL is explicitly set in production
    fn validate_database_url() -> Result<()> {
        match get_required_env("DATABASE_URL") {
            Ok(url) if !url.is_empty() => Ok(()),
            _ => {
                bail!(
                    "DATABASE_URL environment variable is required in production. \
                     Please set your PostgreSQL connection string."
                );
            }
        }
    }

    // Convenience accessors for common config fields

    /// Get database configuration
    pub fn database(&self) -> &DatabaseConfig {
        &self.common.database
    }

    /// Get GraphQL execution limits
    pub fn graphql(&self) -> &GraphQLConfig {
        &self.common.graphql
    }

    /// Get environment mode
    pub fn environment(&self) -> Environment {
        self.common.environment
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }
}
