//! Shared configuration types for Trellis services
//!
//! This crate provides the configuration types read from the environment
//! by the API server: database connectivity, the environment mode and the
//! GraphQL execution limits.

mod database;
mod error;
mod graphql;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ConfigResult};
pub use graphql::{GraphQLConfig, DEFAULT_MAX_DEPTH};

use std::env;

/// Common configuration shared between all services
#[derive(Debug, Clone)]
pub struct CommonConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// GraphQL execution limits
    pub graphql: GraphQLConfig,

    /// Environment mode (development, staging, production)
    pub environment: Environment,
}

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            _ => Self::Development,
        })
    }
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl CommonConfig {
    /// Load common configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env()?,
            graphql: GraphQLConfig::from_env()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse()
                .unwrap_or_default(),
        })
    }
}

/// Helper function to get a required environment variable
pub fn get_required_env(name: &str) -> ConfigResult<String> {
    env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Helper function to get an optional environment variable with a default
pub fn get_env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Helper function to parse an environment variable into a specific type
pub fn parse_env<T>(name: &str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "prod".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!(
            "stage".parse::<Environment>().unwrap(),
            Environment::Staging
        );
        assert_eq!(
            "anything".parse::<Environment>().unwrap(),
            Environment::Development
        );
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(format!("{}", Environment::Production), "production");
        assert_eq!(format!("{}", Environment::Staging), "staging");
        assert_eq!(format!("{}", Environment::Development), "development");
    }

    #[test]
    fn test_get_required_env_missing() {
        temp_env::with_var_unset("TRELLIS_TEST_REQUIRED", || {
            let err = get_required_env("TRELLIS_TEST_REQUIRED").unwrap_err();
            assert_eq!(
                err.to_string(),
                "missing required environment variable: TRELLIS_TEST_REQUIRED"
            );
        });
    }

    #[test]
    fn test_parse_env_invalid_value() {
        temp_env::with_var("TRELLIS_TEST_NUMBER", Some("not-a-number"), || {
            let result = parse_env::<u32>("TRELLIS_TEST_NUMBER", 3);
            assert!(matches!(result, Err(ConfigError::InvalidValue(name, _)) if name == "TRELLIS_TEST_NUMBER"));
        });
    }

    #[test]
    fn test_common_config_defaults() {
        temp_env::with_vars_unset(
            ["ENVIRONMENT", "GRAPHQL_MAX_DEPTH"],
            || {
                let config = CommonConfig::from_env().unwrap();
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.graphql.max_depth, DEFAULT_MAX_DEPTH);
            },
        );
    }
}
