//! CLI-specific functionality for the `ctrmeta` binary
//!
//! This module contains argument parsing, configuration discovery, and the
//! execution of subcommands against the store.

pub mod args;
pub mod commands;
pub mod config;

pub use args::{Args, Commands};
pub use commands::execute;
pub use config::ConfigDiscovery;
