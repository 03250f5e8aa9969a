use crate::containers::{Container, Store};
use crate::context::Context;
use crate::errdefs::{Error, ErrorKind, Result};
use crate::filters::FilterSet;
use crate::metadata::config::StoreConfig;
use crate::metadata::persistence::{Bucket, Db, Persistence};
use crate::metadata::update;
use crate::namespaces;
use crate::validation;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

static EMPTY_BUCKET: Bucket = Bucket::new();

/// Transactional container store.
///
/// All records live in memory behind a single lock. Mutations work on a copy
/// of the affected namespace and are installed only after every check (and
/// the commit to disk, when a root directory is configured) has succeeded,
/// so a failed or abandoned operation never leaves a partial record behind.
pub struct MetadataStore {
    pub(super) db: RwLock<Db>,
    persistence: Option<Persistence>,
}

impl MetadataStore {
    /// Volatile store with no backing files.
    pub fn in_memory() -> Self {
        Self {
            db: RwLock::new(Db::default()),
            persistence: None,
        }
    }

    /// Open the store described by `config`, loading any committed state.
    pub async fn open(config: &StoreConfig) -> std::result::Result<Self, Error> {
        let Some(root) = &config.root else {
            info!("Opened in-memory container store");
            return Ok(Self::in_memory());
        };

        let persistence = Persistence::new(root, config).await?;
        let db = persistence.load().await?;
        info!(
            "Opened container store at {} ({} containers)",
            root.display(),
            db.container_count()
        );

        Ok(Self {
            db: RwLock::new(db),
            persistence: Some(persistence),
        })
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    /// Namespaces holding at least one container.
    pub async fn namespaces(&self, ctx: &Context) -> Result<Vec<String>> {
        let db = ctx.run(self.db.read()).await?;
        Ok(db.namespaces.keys().cloned().collect())
    }

    async fn read<T, F>(&self, ctx: &Context, f: F) -> Result<T>
    where
        F: FnOnce(&Bucket) -> std::result::Result<T, Error> + Send,
    {
        namespaces::validate(ctx.namespace())?;

        let db = ctx.run(self.db.read()).await?;
        let bucket = db.namespaces.get(ctx.namespace()).unwrap_or(&EMPTY_BUCKET);
        Ok(f(bucket)?)
    }

    async fn transact<T, F>(&self, ctx: &Context, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut Bucket) -> std::result::Result<T, Error> + Send,
    {
        let namespace = ctx.namespace();
        namespaces::validate(namespace)?;

        let mut db = ctx.run(self.db.write()).await?;
        let mut bucket = db.namespaces.get(namespace).cloned().unwrap_or_default();
        let output = f(&mut bucket)?;

        // Last chance to abandon the change; past this point it commits.
        ctx.check()?;

        let previous = db.replace_bucket(namespace, bucket);
        if let Some(persistence) = &self.persistence
            && let Err(err) = persistence.save(&db).await
        {
            db.restore_bucket(namespace, previous);
            warn!("Transaction in namespace {} rolled back: {}", namespace, err);
            return Err(err.into());
        }

        Ok(output)
    }
}

#[async_trait]
impl Store for MetadataStore {
    async fn get(&self, ctx: &Context, id: &str) -> Result<Container> {
        debug!("get container {} in namespace {}", id, ctx.namespace());
        self.read(ctx, |bucket| {
            bucket
                .get(id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("container {id:?}")))
        })
        .await
    }

    async fn list(&self, ctx: &Context, filters: &[String]) -> Result<Vec<Container>> {
        let filters = FilterSet::parse(filters).map_err(|err| {
            Error::wrap(ErrorKind::InvalidArgument, "failed to parse filters", err)
        })?;

        let containers = self
            .read(ctx, |bucket| {
                Ok(bucket
                    .values()
                    .filter(|container| filters.matches(*container))
                    .cloned()
                    .collect::<Vec<_>>())
            })
            .await?;

        debug!(
            "list matched {} containers in namespace {}",
            containers.len(),
            ctx.namespace()
        );
        Ok(containers)
    }

    async fn create(&self, ctx: &Context, mut container: Container) -> Result<Container> {
        validation::validate_container(&container).map_err(|err| {
            Error::wrap(
                ErrorKind::InvalidArgument,
                format!("create container {:?}", container.id),
                err,
            )
        })?;

        let created = self
            .transact(ctx, move |bucket| {
                if bucket.contains_key(&container.id) {
                    return Err(Error::already_exists(format!("container {:?}", container.id)));
                }

                let now = Utc::now();
                container.created_at = now;
                container.updated_at = now;
                bucket.insert(container.id.clone(), container.clone());
                Ok(container)
            })
            .await?;

        info!(
            "Created container {} in namespace {}",
            created.id,
            ctx.namespace()
        );
        Ok(created)
    }

    async fn update(
        &self,
        ctx: &Context,
        container: Container,
        fieldpaths: &[String],
    ) -> Result<Container> {
        if container.id.is_empty() {
            return Err(Error::invalid_argument("must specify a container id").into());
        }

        let updated = self
            .transact(ctx, move |bucket| {
                let existing = bucket
                    .get(&container.id)
                    .ok_or_else(|| Error::not_found(format!("container {:?}", container.id)))?;

                let id = container.id.clone();
                let mut updated = update::apply(existing, container, fieldpaths)?;
                validation::validate_container(&updated).map_err(|err| {
                    Error::wrap(
                        ErrorKind::InvalidArgument,
                        format!("update container {id:?}"),
                        err,
                    )
                })?;
                updated.updated_at = update::next_timestamp(existing.updated_at);

                bucket.insert(id, updated.clone());
                Ok(updated)
            })
            .await?;

        debug!(
            "Updated container {} in namespace {} ({:?})",
            updated.id,
            ctx.namespace(),
            fieldpaths
        );
        Ok(updated)
    }

    async fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        self.transact(ctx, |bucket| {
            bucket
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| Error::not_found(format!("container {id:?}")))
        })
        .await?;

        info!("Deleted container {} in namespace {}", id, ctx.namespace());
        Ok(())
    }
}
