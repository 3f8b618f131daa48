// Client configuration.
// Resolves API environment, credentials, and file locations from the environment.

use std::path::PathBuf;

use crate::cache;
use crate::error::{EmergenceError, Result};

const PRODUCTION_BASE: &str = "https://api.artsy.net";
const STAGING_BASE: &str = "https://stagingapi.artsy.net";

/// Which Artsy deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Staging,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_BASE,
            Environment::Staging => STAGING_BASE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
        }
    }
}

/// Everything the client needs, passed explicitly to constructors.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub client_id: String,
    pub client_secret: String,
    /// Replaces the environment's base URL when set.
    pub base_url_override: Option<String>,
    /// Where the XApp token is persisted; `None` keeps it in memory only.
    pub token_cache_path: Option<PathBuf>,
    /// JSON file with known and featured locations.
    pub locations_file: Option<PathBuf>,
}

impl Config {
    pub fn new(
        environment: Environment,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url_override: None,
            token_cache_path: None,
            locations_file: None,
        }
    }

    /// Build a config from `ARTSY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let client_id =
            std::env::var("ARTSY_CLIENT_ID").map_err(|_| EmergenceError::MissingCredentials)?;
        let client_secret =
            std::env::var("ARTSY_CLIENT_SECRET").map_err(|_| EmergenceError::MissingCredentials)?;

        let use_staging = match std::env::var("ARTSY_USE_STAGING") {
            Ok(value) => parse_flag(&value)?,
            Err(_) => false,
        };
        let environment = if use_staging {
            Environment::Staging
        } else {
            Environment::Production
        };

        let mut config = Self::new(environment, client_id, client_secret);
        config.base_url_override = std::env::var("ARTSY_API_BASE_URL")
            .ok()
            .filter(|v| !v.is_empty());
        config.token_cache_path = cache::token_path(environment);
        config.locations_file = std::env::var("EMERGENCE_LOCATIONS_FILE")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Ok(config)
    }

    /// Switch environments, moving the token cache along with it.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        if self.token_cache_path.is_some() {
            self.token_cache_path = cache::token_path(environment);
        }
        self.environment = environment;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn with_token_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_cache_path = Some(path.into());
        self
    }

    /// The base URL requests are sent to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url_override
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(EmergenceError::Config(format!(
            "ARTSY_USE_STAGING must be a boolean, got {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_per_environment() {
        let prod = Config::new(Environment::Production, "id", "secret");
        assert_eq!(prod.base_url(), "https://api.artsy.net");

        let staging = Config::new(Environment::Staging, "id", "secret");
        assert_eq!(staging.base_url(), "https://stagingapi.artsy.net");
    }

    #[test]
    fn test_base_url_override_wins() {
        let config =
            Config::new(Environment::Staging, "id", "secret").with_base_url("http://127.0.0.1:1234/");
        assert_eq!(config.base_url(), "http://127.0.0.1:1234");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true").unwrap());
        assert!(parse_flag(" YES ").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
