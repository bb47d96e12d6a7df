//! Service-account credential resolution.
//!
//! The push provider authenticates with a service-account JSON file. The
//! file path comes from the environment; a missing variable or a path that
//! does not exist is a configuration error surfaced before any store or
//! provider access, never a silent no-op.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Primary env var naming the service-account file.
pub const SERVICE_ACCOUNT_ENV: &str = "NOTIFYD_SERVICE_ACCOUNT_PATH";

/// Fallback env var, shared with other tooling that already sets it.
pub const SERVICE_ACCOUNT_FALLBACK_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Parsed service-account credentials for the push provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    /// Bearer token for the provider API.
    pub api_key: String,
}

/// Resolve the service-account file path from the environment.
pub fn resolve_service_account_path() -> ConfigResult<PathBuf> {
    let raw = non_empty_env(SERVICE_ACCOUNT_ENV)
        .or_else(|| non_empty_env(SERVICE_ACCOUNT_FALLBACK_ENV))
        .ok_or(ConfigError::CredentialsNotConfigured)?;

    let path = PathBuf::from(raw.trim());
    if !path.is_file() {
        return Err(ConfigError::CredentialFileNotFound(path));
    }
    Ok(path)
}

/// Load and parse a service-account file.
pub fn load_service_account(path: &Path) -> ConfigResult<ServiceAccount> {
    let content = std::fs::read_to_string(path)?;
    let account: ServiceAccount = serde_json::from_str(&content)?;
    Ok(account)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    /// Env-mutating tests must not run concurrently.
    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_env() {
        std::env::remove_var(SERVICE_ACCOUNT_ENV);
        std::env::remove_var(SERVICE_ACCOUNT_FALLBACK_ENV);
    }

    #[test]
    fn test_unset_env_is_a_configuration_error() {
        let _guard = env_lock().lock().unwrap();
        clear_env();

        let result = resolve_service_account_path();
        assert!(matches!(result, Err(ConfigError::CredentialsNotConfigured)));

        std::env::set_var(SERVICE_ACCOUNT_ENV, "   ");
        let result = resolve_service_account_path();
        assert!(matches!(result, Err(ConfigError::CredentialsNotConfigured)));
        clear_env();
    }

    #[test]
    fn test_missing_file_is_a_configuration_error() {
        let _guard = env_lock().lock().unwrap();
        clear_env();

        std::env::set_var(SERVICE_ACCOUNT_ENV, "/nonexistent/service-account.json");
        let result = resolve_service_account_path();
        assert!(matches!(result, Err(ConfigError::CredentialFileNotFound(_))));
        clear_env();
    }

    #[test]
    fn test_primary_env_wins_over_fallback() {
        let _guard = env_lock().lock().unwrap();
        clear_env();

        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("primary.json");
        let fallback = dir.path().join("fallback.json");
        std::fs::write(&primary, "{}").unwrap();
        std::fs::write(&fallback, "{}").unwrap();

        std::env::set_var(SERVICE_ACCOUNT_ENV, &primary);
        std::env::set_var(SERVICE_ACCOUNT_FALLBACK_ENV, &fallback);

        let path = resolve_service_account_path().unwrap();
        assert_eq!(path, primary);
        clear_env();
    }

    #[test]
    fn test_fallback_env_used_when_primary_unset() {
        let _guard = env_lock().lock().unwrap();
        clear_env();

        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("fallback.json");
        std::fs::write(&fallback, "{}").unwrap();

        std::env::set_var(SERVICE_ACCOUNT_FALLBACK_ENV, &fallback);
        let path = resolve_service_account_path().unwrap();
        assert_eq!(path, fallback);
        clear_env();
    }

    #[test]
    fn test_load_service_account() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service-account.json");
        std::fs::write(
            &path,
            r#"{ "project_id": "linkod-dev", "api_key": "sk-test-123" }"#,
        )
        .unwrap();

        let account = load_service_account(&path).unwrap();
        assert_eq!(account.project_id, "linkod-dev");
        assert_eq!(account.api_key, "sk-test-123");
    }

    #[test]
    fn test_load_service_account_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert!(load_service_account(&path).is_err());
    }
}
