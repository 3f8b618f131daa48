// Cache path utilities.
// Constructs filesystem paths under the platform cache directory.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::config::Environment;

/// Get the base cache directory (~/.cache/emergence on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "emergence").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the persisted XApp token for an environment.
///
/// Tokens are environment specific, so staging and production never share one.
pub fn token_path(environment: Environment) -> Option<PathBuf> {
    cache_dir().map(|dir| token_path_in(&dir, environment))
}

/// Token path relative to an explicit directory.
pub fn token_path_in(dir: &std::path::Path, environment: Environment) -> PathBuf {
    dir.join("tokens")
        .join(format!("xapp_token_{}.json", environment.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_paths_differ_per_environment() {
        let dir = PathBuf::from("/tmp/emergence");
        let prod = token_path_in(&dir, Environment::Production);
        let staging = token_path_in(&dir, Environment::Staging);

        assert!(prod.ends_with("tokens/xapp_token_production.json"));
        assert!(staging.ends_with("tokens/xapp_token_staging.json"));
        assert_ne!(prod, staging);
    }
}
