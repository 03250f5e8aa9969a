use async_trait::async_trait;

use crate::containers::Container;
use crate::context::Context;
use crate::errdefs::Result;

/// Interacts with the underlying container storage.
///
/// Every call is scoped to `ctx.namespace()` and must give up with a
/// [`ContextError`](crate::context::ContextError) once `ctx` is cancelled or
/// its deadline passes, without leaving a partially applied change behind.
/// Implementations are shared between tasks and must be safe to call
/// concurrently; create, update and delete of the same id are linearizable.
#[async_trait]
pub trait Store: Send + Sync {
    /// Get a container using the id.
    ///
    /// Fails with `NotFound` if the id is not known in the namespace.
    async fn get(&self, ctx: &Context, id: &str) -> Result<Container>;

    /// Containers matching one or more of the provided filters.
    ///
    /// An empty filter list matches every container. No match is an empty
    /// list, not an error.
    async fn list(&self, ctx: &Context, filters: &[String]) -> Result<Vec<Container>>;

    /// Create a container in the store from the provided container.
    ///
    /// Timestamps are set by the store; the ones passed in are ignored.
    /// Fails with `InvalidArgument` for a malformed record and
    /// `AlreadyExists` if the id is taken.
    async fn create(&self, ctx: &Context, container: Container) -> Result<Container>;

    /// Update the container with the provided container object. The id must
    /// be set.
    ///
    /// If one or more fieldpaths are provided, only the fields corresponding
    /// to the fieldpaths are mutated. Otherwise every mutable field is
    /// replaced.
    async fn update(
        &self,
        ctx: &Context,
        container: Container,
        fieldpaths: &[String],
    ) -> Result<Container>;

    /// Delete a container using the id.
    ///
    /// Fails with `NotFound` if the container is not known to the store.
    async fn delete(&self, ctx: &Context, id: &str) -> Result<()>;
}
