//! Embedded, transactional implementation of the container [`Store`].
//!
//! [`MetadataStore`] keeps records per namespace, serializes mutations
//! behind one lock, and optionally commits every change to a JSON file with
//! temp-file-and-rename atomicity.
//!
//! [`Store`]: crate::containers::Store

pub mod config;
pub mod persistence;
pub mod store;
pub mod update;


pub use config::StoreConfig;
pub use persistence::{Db, Persistence, PersistenceResult};
pub use store::MetadataStore;
pub use update::FieldPath;
