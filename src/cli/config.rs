//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Explicit `--config` path
//! 2. Current directory: ./ctrmeta.toml or ./.ctrmeta/config.toml
//! 3. User config: ~/.ctrmeta/config.toml
//! 4. System config: /etc/ctrmeta/config.toml
//! 5. Built-in defaults

use crate::{env, metadata::StoreConfig};
use anyhow::{Context as _, Result};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load a store configuration from a TOML file
pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<StoreConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    let config: StoreConfig = toml::from_str(&content)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    Ok(config)
}

/// Save a store configuration to a TOML file
pub fn to_toml_file<P: AsRef<Path>>(config: &StoreConfig, path: P) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    fs::write(path.as_ref(), content)
        .with_context(|| format!("failed to write {}", path.as_ref().display()))?;
    Ok(())
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Load `explicit` if given, otherwise the first file found in the
    /// discovery hierarchy, otherwise the defaults.
    pub fn discover_config(explicit: Option<&Path>) -> Result<StoreConfig> {
        if let Some(path) = explicit {
            info!("Loading configuration override from: {:?}", path);
            return from_toml_file(path);
        }

        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return from_toml_file(config_path);
        }

        info!("No configuration file found, using defaults");
        Ok(StoreConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        let found = Self::first_existing(&Self::get_config_candidates());
        if found.is_none() {
            debug!("No config file found in discovery hierarchy");
        }
        found
    }

    fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates
            .iter()
            .inspect(|candidate| debug!("Checking for config file: {:?}", candidate))
            .find(|candidate| candidate.is_file())
            .cloned()
    }

    /// Get list of configuration file candidates in priority order
    pub fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        #[cfg(unix)]
        candidates.push(PathBuf::from(env::SYSTEM_CONFIG_FILE));

        candidates
    }

    fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info(explicit: Option<&Path>) {
        println!("Configuration Discovery Hierarchy:");
        println!();

        if let Some(path) = explicit {
            println!("  --config {:?} - {}", path, Self::status(path));
        }
        let candidates = Self::get_config_candidates();
        for (i, candidate) in candidates.iter().enumerate() {
            println!("  {}. {:?} - {}", i + 1, candidate, Self::status(candidate));
        }

        println!();
        match explicit.map(Path::to_path_buf).or_else(Self::find_config_file) {
            Some(found) => println!("Active configuration: {:?}", found),
            None => println!("Active configuration: Built-in defaults"),
        }
    }

    fn status(path: &Path) -> &'static str {
        if path.is_file() {
            "✓ EXISTS"
        } else if path.exists() {
            "✗ NOT A FILE"
        } else {
            "✗ NOT FOUND"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("ctrmeta.toml");
        fs::write(
            &config_path,
            "root = \"/var/lib/ctrmeta\"\noperation_timeout_ms = 500\n",
        )
        .unwrap();

        let config = from_toml_file(&config_path).unwrap();
        assert_eq!(config.root, Some(PathBuf::from("/var/lib/ctrmeta")));
        assert_eq!(config.operation_timeout_ms, 500);
        assert!(config.checksum_validation);
        assert!(config.sync_writes);
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let mut original = StoreConfig::with_root(temp_dir.path().join("store"));
        original.default_namespace = "team-a".to_string();
        original.sync_writes = false;

        to_toml_file(&original, &config_path).unwrap();
        assert_eq!(from_toml_file(&config_path).unwrap(), original);
    }

    #[test]
    fn test_explicit_config_wins() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("explicit.toml");
        fs::write(&config_path, "default_namespace = \"explicit\"\n").unwrap();

        let config = ConfigDiscovery::discover_config(Some(&config_path)).unwrap();
        assert_eq!(config.default_namespace, "explicit");
        assert!(config.root.is_none());
    }

    #[test]
    fn test_missing_or_invalid_explicit_config_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        assert!(ConfigDiscovery::discover_config(Some(&missing)).is_err());

        let invalid = temp_dir.path().join("invalid.toml");
        fs::write(&invalid, "operation_timeout_ms = \"soon\"\n").unwrap();
        let err = ConfigDiscovery::discover_config(Some(&invalid)).unwrap_err();
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn test_first_existing_candidate() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.toml");
        let second = temp_dir.path().join("second.toml");
        fs::write(&second, "").unwrap();

        assert_eq!(
            ConfigDiscovery::first_existing(&[first.clone(), second.clone()]),
            Some(second)
        );
        assert_eq!(ConfigDiscovery::first_existing(&[first]), None);
        assert_eq!(
            ConfigDiscovery::first_existing(&[temp_dir.path().to_path_buf()]),
            None
        );
    }

    #[test]
    fn test_config_candidates() {
        let candidates = ConfigDiscovery::get_config_candidates();

        assert!(!candidates.is_empty());
        assert!(candidates[0].file_name().unwrap() == "ctrmeta.toml");
    }
}
