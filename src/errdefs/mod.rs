//! Common error classes shared by every store implementation.
//!
//! Errors returned by the store map into one small, closed set of kinds.
//! Callers decide what to do (retry, surface to the user, give up) by asking
//! one of the `is_*` predicates, never by matching on message text.
//!
//! The predicates walk the whole [`source`](std::error::Error::source) chain,
//! so a classified error stays classifiable after being wrapped by
//! [`Error::wrap`], by `anyhow::Context`, or by any other error type that
//! reports its cause.
//!
//! Cancellation and deadline expiry are reported by the caller's
//! [`Context`](crate::context::Context) as [`ContextError`] and are never
//! folded into the store-specific kinds.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::context::ContextError;


/// Boxed cause attached to an [`Error`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Store-specific error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A failure that was not mapped to a more specific class.
    Unknown,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    FailedPrecondition,
    Unavailable,
    /// Not supported or not implemented.
    NotImplemented,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unknown => "unknown",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NotFound => "not found",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::FailedPrecondition => "failed precondition",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::NotImplemented => "not implemented",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified error with an optional underlying cause.
#[derive(Debug, thiserror::Error)]
#[error("{message}: {kind}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Classify `cause` as `kind`, keeping it reachable through `source()`.
    pub fn wrap(kind: ErrorKind, message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FailedPrecondition, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }

    /// First store-specific kind found in the chain of `err`.
    ///
    /// Returns [`ErrorKind::Unknown`] when no link carries a kind, which is
    /// also what a missing mapping looks like to callers.
    pub fn classify(err: &(dyn StdError + 'static)) -> ErrorKind {
        chain(err)
            .find_map(|link| match tag(link) {
                Some(Tag::Kind(kind)) => Some(kind),
                _ => None,
            })
            .unwrap_or(ErrorKind::Unknown)
    }
}

/// Error returned by [`Store`](crate::containers::Store) operations.
///
/// Keeps "the store rejected this" apart from "the caller gave up".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Store(#[from] Error),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl StoreError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            StoreError::Store(err) => Some(err.kind()),
            StoreError::Context(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        is_not_found(self)
    }

    pub fn is_already_exists(&self) -> bool {
        is_already_exists(self)
    }

    pub fn is_invalid_argument(&self) -> bool {
        is_invalid_argument(self)
    }

    pub fn is_canceled(&self) -> bool {
        is_canceled(self)
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        is_deadline_exceeded(self)
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

enum Tag {
    Kind(ErrorKind),
    Context(ContextError),
}

// `StoreError` is transparent, so its `source()` skips the wrapped value;
// look through it explicitly.
fn tag(link: &(dyn StdError + 'static)) -> Option<Tag> {
    if let Some(err) = link.downcast_ref::<Error>() {
        return Some(Tag::Kind(err.kind()));
    }
    if let Some(err) = link.downcast_ref::<ContextError>() {
        return Some(Tag::Context(*err));
    }
    match link.downcast_ref::<StoreError>() {
        Some(StoreError::Store(err)) => Some(Tag::Kind(err.kind())),
        Some(StoreError::Context(err)) => Some(Tag::Context(*err)),
        None => None,
    }
}

fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&link| link.source())
}

fn has_kind(err: &(dyn StdError + 'static), kind: ErrorKind) -> bool {
    chain(err).any(|link| matches!(tag(link), Some(Tag::Kind(k)) if k == kind))
}

fn has_context(err: &(dyn StdError + 'static), expected: ContextError) -> bool {
    chain(err).any(|link| matches!(tag(link), Some(Tag::Context(c)) if c == expected))
}

/// Returns true if the error is an unmapped failure.
pub fn is_unknown(err: &(dyn StdError + 'static)) -> bool {
    has_kind(err, ErrorKind::Unknown)
}

/// Returns true if the error is due to an invalid argument.
pub fn is_invalid_argument(err: &(dyn StdError + 'static)) -> bool {
    has_kind(err, ErrorKind::InvalidArgument)
}

/// Returns true if the error is due to a missing object.
pub fn is_not_found(err: &(dyn StdError + 'static)) -> bool {
    has_kind(err, ErrorKind::NotFound)
}

/// Returns true if the error is due to an already existing metadata item.
pub fn is_already_exists(err: &(dyn StdError + 'static)) -> bool {
    has_kind(err, ErrorKind::AlreadyExists)
}

/// Returns true if an operation could not proceed due to the lack of a
/// particular condition.
pub fn is_failed_precondition(err: &(dyn StdError + 'static)) -> bool {
    has_kind(err, ErrorKind::FailedPrecondition)
}

/// Returns true if the error is due to a resource being unavailable.
pub fn is_unavailable(err: &(dyn StdError + 'static)) -> bool {
    has_kind(err, ErrorKind::Unavailable)
}

/// Returns true if the error is due to not being implemented.
pub fn is_not_implemented(err: &(dyn StdError + 'static)) -> bool {
    has_kind(err, ErrorKind::NotImplemented)
}

/// Returns true if the caller's context was cancelled.
pub fn is_canceled(err: &(dyn StdError + 'static)) -> bool {
    has_context(err, ContextError::Canceled)
}

/// Returns true if the caller's deadline expired.
pub fn is_deadline_exceeded(err: &(dyn StdError + 'static)) -> bool {
    has_context(err, ContextError::DeadlineExceeded)
}
