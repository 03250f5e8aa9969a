//! Environment constants and path utilities.
//!
//! Centralizes the directory and file names used by the on-disk store and
//! by configuration discovery.

use std::path::{Path, PathBuf};

/// Hidden per-project directory name (like .git)
pub const CTRMETA_DIR_NAME: &str = ".ctrmeta";

/// Configuration file name inside a `.ctrmeta` directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up directly in the working directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "ctrmeta.toml";

/// System-wide configuration file
pub const SYSTEM_CONFIG_FILE: &str = "/etc/ctrmeta/config.toml";

/// Environment variable overriding the default namespace
pub const NAMESPACE_ENV_VAR: &str = "CTRMETA_NAMESPACE";

/// Store layout below the configured root
pub mod store {
    /// Directory holding committed metadata
    pub const META_DIR_NAME: &str = "meta";

    /// Committed container records
    pub const CONTAINERS_FILE_NAME: &str = "containers.json";

    /// Staging directory for in-flight commits
    pub const TEMP_DIR_NAME: &str = "tmp";
}

pub fn meta_dir_path(root: &Path) -> PathBuf {
    root.join(store::META_DIR_NAME)
}

pub fn temp_dir_path(root: &Path) -> PathBuf {
    root.join(store::TEMP_DIR_NAME)
}

/// Build the committed containers file path
pub fn containers_file_path(root: &Path) -> PathBuf {
    meta_dir_path(root).join(store::CONTAINERS_FILE_NAME)
}

/// Checksum file stored next to a data file
pub fn checksum_file_path(data_file: &Path) -> PathBuf {
    data_file.with_extension("checksum")
}

/// Build config directory path in user's home directory
pub fn user_config_dir_path(home_dir: &Path) -> PathBuf {
    home_dir.join(CTRMETA_DIR_NAME)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    user_config_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(CTRMETA_DIR_NAME).join(CONFIG_FILE_NAME)
}
