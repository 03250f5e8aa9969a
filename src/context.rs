//! Per-call namespace, cancellation and deadline.
//!
//! Every store operation takes a [`Context`] explicitly. The namespace scopes
//! the operation, and the cancellation token and optional deadline bound how
//! long it may run.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::namespaces;

/// Why a context stopped an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct Context {
    namespace: String,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Context scoped to `namespace` with no deadline.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Context for the default namespace.
    pub fn background() -> Self {
        Self::new(namespaces::default_namespace())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Same cancellation and deadline, different namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Deadline `timeout` from now. An earlier existing deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.with_deadline(deadline)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Derived context that is cancelled along with this one but can also be
    /// cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fails if the context has been cancelled or its deadline has passed.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.cancel.is_cancelled() {
            return Err(ContextError::Canceled);
        }
        if let Some(deadline) = self.deadline
            && deadline <= Instant::now()
        {
            return Err(ContextError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Run `fut` until it completes or the context fires, whichever is first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ContextError::Canceled),
            _ = deadline => Err(ContextError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}
