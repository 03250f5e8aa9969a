use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::namespaces;

/// Configuration for [`MetadataStore`](super::MetadataStore)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the committed records. `None` keeps everything in
    /// memory.
    pub root: Option<PathBuf>,
    pub default_namespace: String,
    /// Deadline applied to each operation by callers that build their own
    /// contexts from this config. Zero disables it.
    pub operation_timeout_ms: u64,
    pub checksum_validation: bool,
    /// fsync data files before the commit rename.
    pub sync_writes: bool,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            root: None,
            ..Default::default()
        }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Default::default()
        }
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        (self.operation_timeout_ms > 0).then(|| Duration::from_millis(self.operation_timeout_ms))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            default_namespace: namespaces::default_namespace(),
            operation_timeout_ms: 30_000,
            checksum_validation: true,
            sync_writes: true,
        }
    }
}
