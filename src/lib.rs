//! # ctrmeta
//!
//! A namespaced metadata store for container records, with a small error
//! taxonomy that lets callers branch on failure kinds regardless of how
//! deeply the original error was wrapped.
//!
//! ## Architecture Overview
//!
//! - **[`containers`]**: The [`Container`] record and the abstract [`Store`] contract
//! - **[`metadata`]**: [`MetadataStore`], the embedded transactional implementation
//! - **[`errdefs`]**: Error kinds, wrapping, and chain-walking predicates
//! - **[`context`]**: Per-call namespace, cancellation and deadline
//! - **[`filters`]**: The filter expression language used by `list`
//! - **[`cli`]**: Argument parsing and configuration discovery for the binary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ctrmeta::{Any, Container, Context, MetadataStore, Store, StoreConfig, errdefs};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = MetadataStore::open(&StoreConfig::with_root("/var/lib/ctrmeta")).await?;
//!     let ctx = Context::new("default");
//!
//!     let container = Container::new(
//!         "redis",
//!         "io.containerd.runc.v2",
//!         Any::new("types.containerd.io/opencontainers/runtime-spec/1/Spec", b"{}".to_vec()),
//!     )
//!     .with_label("env", "prod");
//!     store.create(&ctx, container).await?;
//!
//!     let prod = store.list(&ctx, &["labels.env==prod".to_string()]).await?;
//!     println!("{} production containers", prod.len());
//!
//!     if let Err(err) = store.get(&ctx, "missing").await {
//!         assert!(errdefs::is_not_found(&err));
//!     }
//!     Ok(())
//! }
//! ```

/// Container records and the store contract.
pub mod containers;

/// Per-call context carrying namespace, cancellation and deadline.
pub mod context;

/// Error kinds shared by every store implementation.
pub mod errdefs;

/// Filter expressions over container fields.
pub mod filters;

/// Embedded transactional store with optional file persistence.
pub mod metadata;

/// Namespace defaults and validation.
pub mod namespaces;

/// Identifier, label and record validation.
pub mod validation;

/// Environment constants and path utilities.
///
/// Centralizes the hardcoded paths and directory names used by the store
/// layout and configuration discovery.
pub mod env;

// CLI module for command-line interface
pub mod cli;

pub use containers::{Any, Container, RuntimeInfo, Store};
pub use context::{Context, ContextError};
pub use errdefs::{Error, ErrorKind, StoreError};
pub use filters::FilterSet;
pub use metadata::{MetadataStore, StoreConfig};
