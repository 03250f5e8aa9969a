//! Container metadata records and the store contract.

pub mod store;
pub mod types;

pub use store::Store;
pub use types::{Any, Container, RuntimeInfo};
