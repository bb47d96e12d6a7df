//! File system paths for the notification service.

use crate::{ConfigError, ConfigResult};
use std::path::PathBuf;

/// Manages file system paths for the service.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.notifyd)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.notifyd`.
    pub fn new() -> ConfigResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| ConfigError::Path("Could not determine home directory".to_string()))?;
        Ok(Self {
            base_dir: home.join(".notifyd"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.notifyd).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.notifyd/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the directory database path (~/.notifyd/directory.db).
    pub fn database_file(&self) -> PathBuf {
        self.base_dir.join("directory.db")
    }

    /// Get the audience rule file path (~/.notifyd/audience_rules.json).
    pub fn rules_file(&self) -> PathBuf {
        self.base_dir.join("audience_rules.json")
    }

    /// Ensure the base directory exists.
    pub fn ensure_dirs(&self) -> ConfigResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_with_base_dir() {
        let paths = Paths::with_base_dir(PathBuf::from("/tmp/notifyd-test"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/notifyd-test/config.json"));
        assert_eq!(paths.database_file(), PathBuf::from("/tmp/notifyd-test/directory.db"));
        assert_eq!(
            paths.rules_file(),
            PathBuf::from("/tmp/notifyd-test/audience_rules.json")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_base() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("nested").join("base"));
        paths.ensure_dirs().unwrap();
        assert!(paths.base_dir().is_dir());
    }
}
