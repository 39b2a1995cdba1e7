//! GraphQL execution limits

use crate::{parse_env, ConfigError, ConfigResult};

/// Nesting bound applied when `GRAPHQL_MAX_DEPTH` is not set
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Limits enforced on incoming query documents before execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphQLConfig {
    /// Maximum selection-set nesting depth of an operation
    pub max_depth: usize,
}

impl GraphQLConfig {
    /// Load GraphQL limits from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let max_depth = parse_env("GRAPHQL_MAX_DEPTH", DEFAULT_MAX_DEPTH)?;
        if max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "GRAPHQL_MAX_DEPTH must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_depth })
    }
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
