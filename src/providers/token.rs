//! Shared token resolution for remote backends.

use std::env;

use thiserror::Error;

use crate::core::Config;

/// No token could be found in any source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no API token found for `{provider}` (checked TASKBRIDGE_{env_name}_TOKEN, provider env vars, and config)")]
pub struct NoTokenError {
    pub provider: String,
    pub env_name: String,
}

/// Token sources for one backend.
pub struct TokenResolver {
    /// Uppercase name for the `TASKBRIDGE_{NAME}_TOKEN` variable.
    env_name: &'static str,
    /// Provider-native fallback variables, e.g. `GITLAB_TOKEN`.
    fallback_vars: &'static [&'static str],
}

impl TokenResolver {
    pub fn new(env_name: &'static str, fallback_vars: &'static [&'static str]) -> Self {
        TokenResolver {
            env_name,
            fallback_vars,
        }
    }

    /// Resolve a token.
    ///
    /// Priority order: `TASKBRIDGE_{NAME}_TOKEN`, then each fallback
    /// variable in order, then the `token` config key. Empty values are
    /// skipped at every step.
    pub fn resolve(&self, provider: &str, config: &Config) -> Result<String, NoTokenError> {
        let bridged = format!("TASKBRIDGE_{}_TOKEN", self.env_name);
        if let Some(token) = non_empty_env(&bridged) {
            return Ok(token);
        }

        for var in self.fallback_vars {
            if let Some(token) = non_empty_env(var) {
                return Ok(token);
            }
        }

        let from_config = config.get_string("token");
        if !from_config.is_empty() {
            return Ok(from_config);
        }

        Err(NoTokenError {
            provider: provider.to_string(),
            env_name: self.env_name.to_string(),
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
