use crate::containers::Container;
use crate::env;
use crate::errdefs::{Error, ErrorKind};
use crate::metadata::config::StoreConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// On-disk format version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Containers of one namespace, keyed by id.
pub type Bucket = BTreeMap<String, Container>;

/// Complete store state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Db {
    pub version: u32,
    pub namespaces: BTreeMap<String, Bucket>,
}

impl Default for Db {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            namespaces: BTreeMap::new(),
        }
    }
}

impl Db {
    pub fn container_count(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    /// Install `bucket` for `namespace`, returning what it replaced. Empty
    /// buckets are dropped so unused namespaces disappear.
    pub fn replace_bucket(&mut self, namespace: &str, bucket: Bucket) -> Option<Bucket> {
        if bucket.is_empty() {
            self.namespaces.remove(namespace)
        } else {
            self.namespaces.insert(namespace.to_string(), bucket)
        }
    }

    /// Undo a [`Db::replace_bucket`].
    pub fn restore_bucket(&mut self, namespace: &str, previous: Option<Bucket>) {
        match previous {
            Some(bucket) => {
                self.namespaces.insert(namespace.to_string(), bucket);
            }
            None => {
                self.namespaces.remove(namespace);
            }
        }
    }
}

/// Result of a commit
#[derive(Debug)]
pub struct PersistenceResult {
    pub bytes_written: u64,
    pub duration_ms: u64,
    pub checksum: String,
}

/// Atomic file persistence for the store state.
///
/// A commit writes the whole state to a uniquely named file in the staging
/// directory, syncs it, and renames it over the committed file. Readers of
/// the directory see either the old or the new state, never a mix.
#[derive(Debug)]
pub struct Persistence {
    data_file: PathBuf,
    temp_dir: PathBuf,
    checksum_validation: bool,
    sync_writes: bool,
}

impl Persistence {
    /// Prepare the directory layout below `root`.
    pub async fn new(root: &Path, config: &StoreConfig) -> Result<Self, Error> {
        let meta_dir = env::meta_dir_path(root);
        let temp_dir = env::temp_dir_path(root);

        for dir in [&meta_dir, &temp_dir] {
            async_fs::create_dir_all(dir)
                .await
                .map_err(|err| unavailable("failed to create directory", dir, err))?;
        }

        Ok(Self {
            data_file: env::containers_file_path(root),
            temp_dir,
            checksum_validation: config.checksum_validation,
            sync_writes: config.sync_writes,
        })
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Load committed state. A missing file is an empty store.
    pub async fn load(&self) -> Result<Db, Error> {
        let content = match async_fs::read(&self.data_file).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No committed state at {}", self.data_file.display());
                return Ok(Db::default());
            }
            Err(err) => return Err(unavailable("failed to read", &self.data_file, err)),
        };

        if self.checksum_validation {
            self.validate_checksum(&content).await?;
        }

        let db: Db = serde_json::from_slice(&content).map_err(|err| {
            Error::wrap(
                ErrorKind::FailedPrecondition,
                format!("corrupted store state in {}", self.data_file.display()),
                err,
            )
        })?;

        if db.version != FORMAT_VERSION {
            return Err(Error::failed_precondition(format!(
                "unsupported store format version {} (expected {FORMAT_VERSION})",
                db.version
            )));
        }

        info!(
            "Loaded {} containers in {} namespaces from {}",
            db.container_count(),
            db.namespaces.len(),
            self.data_file.display()
        );
        Ok(db)
    }

    /// Commit `db` atomically.
    pub async fn save(&self, db: &Db) -> Result<PersistenceResult, Error> {
        let start_time = std::time::Instant::now();

        let serialized = serde_json::to_vec_pretty(db).map_err(|err| {
            Error::wrap(ErrorKind::Unknown, "failed to serialize store state", err)
        })?;
        let checksum = calculate_checksum(&serialized);

        let transaction_id = uuid::Uuid::new_v4();
        let temp_file = self.temp_dir.join(format!("containers_{transaction_id}.json"));
        let temp_checksum = env::checksum_file_path(&temp_file);

        let staged = match self.write_file(&temp_file, &serialized).await {
            Ok(()) if self.checksum_validation => {
                self.write_file(&temp_checksum, checksum.as_bytes()).await
            }
            other => other,
        };
        if let Err(err) = staged {
            self.discard(&[temp_file.as_path(), temp_checksum.as_path()])
                .await;
            return Err(err);
        }

        if let Err(err) = async_fs::rename(&temp_file, &self.data_file).await {
            warn!("Commit {} failed: {}", transaction_id, err);
            self.discard(&[temp_file.as_path(), temp_checksum.as_path()])
                .await;
            return Err(unavailable("failed to commit", &self.data_file, err));
        }

        // The data is committed at this point. A checksum that cannot be
        // installed is removed so it never disagrees with the data.
        if self.checksum_validation {
            let checksum_file = env::checksum_file_path(&self.data_file);
            if let Err(err) = async_fs::rename(&temp_checksum, &checksum_file).await {
                warn!(
                    "Failed to install checksum for commit {}: {}",
                    transaction_id, err
                );
                self.discard(&[temp_checksum.as_path(), checksum_file.as_path()])
                    .await;
            }
        } else {
            // A checksum from an earlier commit no longer describes the data.
            self.discard(&[env::checksum_file_path(&self.data_file).as_path()])
                .await;
        }

        let result = PersistenceResult {
            bytes_written: serialized.len() as u64,
            duration_ms: start_time.elapsed().as_millis() as u64,
            checksum,
        };
        debug!(
            "Committed {}: {} bytes in {}ms",
            transaction_id, result.bytes_written, result.duration_ms
        );
        Ok(result)
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<(), Error> {
        let mut file = async_fs::File::create(path)
            .await
            .map_err(|err| unavailable("failed to create", path, err))?;

        file.write_all(data)
            .await
            .map_err(|err| unavailable("failed to write", path, err))?;

        if self.sync_writes {
            file.sync_all()
                .await
                .map_err(|err| unavailable("failed to sync", path, err))?;
        }
        Ok(())
    }

    async fn discard(&self, paths: &[&Path]) {
        for path in paths {
            if let Err(err) = async_fs::remove_file(path).await
                && err.kind() != std::io::ErrorKind::NotFound
            {
                warn!("Failed to remove {}: {}", path.display(), err);
            }
        }
    }

    async fn validate_checksum(&self, data: &[u8]) -> Result<(), Error> {
        let checksum_file = env::checksum_file_path(&self.data_file);

        let stored = match async_fs::read_to_string(&checksum_file).await {
            Ok(stored) => stored,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "No checksum for {}, skipping validation",
                    self.data_file.display()
                );
                return Ok(());
            }
            Err(err) => return Err(unavailable("failed to read", &checksum_file, err)),
        };

        if stored.trim() != calculate_checksum(data) {
            return Err(Error::failed_precondition(format!(
                "checksum validation failed for {}",
                self.data_file.display()
            )));
        }
        Ok(())
    }
}

fn calculate_checksum(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn unavailable(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::wrap(
        ErrorKind::Unavailable,
        format!("{action} {}", path.display()),
        err,
    )
}
