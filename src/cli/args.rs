//! Command line argument parsing
//!
//! Global options select the configuration, store root, namespace and
//! per-operation timeout. Subcommands map onto store operations:
//! - `list`: List containers, optionally filtered
//! - `get`: Show one container
//! - `create`: Create a container record
//! - `update`: Update selected fields of a container
//! - `delete`: Delete a container
//! - `namespaces`: List namespaces holding containers
//! - `show-config`: Show configuration discovery information

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ctrmeta")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and edit a namespaced container metadata store")]
#[command(long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Configuration file path (skips discovery)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Store root directory, overriding the configuration
    #[arg(long = "root", global = true)]
    pub root: Option<PathBuf>,
    /// Namespace to operate in
    #[arg(short = 'n', long = "namespace", global = true)]
    pub namespace: Option<String>,
    /// Per-operation timeout in milliseconds (0 disables it)
    #[arg(long = "timeout", value_name = "MS", global = true)]
    pub timeout_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// List containers matching any of the filters
    List {
        /// Filter expressions, e.g. `labels.env==prod,image~=^redis`
        filters: Vec<String>,
    },
    /// Show a container
    Get { id: String },
    /// Create a container
    Create {
        id: String,
        /// Runtime name
        #[arg(long = "runtime")]
        runtime: String,
        /// Type URL of the runtime specification
        #[arg(long = "spec-type", value_name = "URL")]
        spec_type: String,
        /// File holding the encoded runtime specification
        #[arg(long = "spec-file", value_name = "PATH")]
        spec_file: PathBuf,
        #[arg(long = "image")]
        image: Option<String>,
        /// Label to set (can be used multiple times)
        #[arg(long = "label", value_name = "KEY=VALUE", value_parser = parse_label)]
        labels: Vec<(String, String)>,
        #[arg(long = "snapshotter")]
        snapshotter: Option<String>,
        #[arg(long = "snapshot-key")]
        snapshot_key: Option<String>,
        /// Sandbox the container belongs to
        #[arg(long = "sandbox")]
        sandbox: Option<String>,
    },
    /// Update a container
    ///
    /// Without `--field`, the field paths are derived from the options given.
    /// An empty label value removes the label.
    Update {
        id: String,
        #[arg(long = "image")]
        image: Option<String>,
        #[arg(long = "label", value_name = "KEY=VALUE", value_parser = parse_label)]
        labels: Vec<(String, String)>,
        #[arg(long = "snapshot-key")]
        snapshot_key: Option<String>,
        /// Field path to update (can be used multiple times)
        #[arg(long = "field", value_name = "PATH")]
        fields: Vec<String>,
    },
    /// Delete a container
    Delete { id: String },
    /// List namespaces holding at least one container
    Namespaces,
    /// Show configuration discovery information
    ShowConfig,
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }
}

/// Parse a `KEY=VALUE` label argument. The value may be empty.
fn parse_label(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid label {raw:?}, expected KEY=VALUE")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "ctrmeta", "list", "-n", "team-a", "--timeout", "500", "labels.env==prod",
        ])
        .unwrap();

        assert_eq!(args.namespace.as_deref(), Some("team-a"));
        assert_eq!(args.timeout_ms, Some(500));
        match args.command {
            Some(Commands::List { filters }) => assert_eq!(filters, vec!["labels.env==prod"]),
            other => panic!("Expected List, got {other:?}"),
        }
    }

    #[test]
    fn test_create_command() {
        let args = Args::try_parse_from([
            "ctrmeta",
            "create",
            "c1",
            "--runtime",
            "io.containerd.runc.v2",
            "--spec-type",
            "types.test/Spec",
            "--spec-file",
            "spec.json",
            "--label",
            "env=prod",
            "--label",
            "note=",
        ])
        .unwrap();

        match args.command {
            Some(Commands::Create {
                id,
                runtime,
                labels,
                image,
                ..
            }) => {
                assert_eq!(id, "c1");
                assert_eq!(runtime, "io.containerd.runc.v2");
                assert_eq!(
                    labels,
                    vec![
                        ("env".to_string(), "prod".to_string()),
                        ("note".to_string(), String::new())
                    ]
                );
                assert!(image.is_none());
            }
            other => panic!("Expected Create, got {other:?}"),
        }
    }

    #[test]
    fn test_create_requires_runtime_and_spec() {
        assert!(Args::try_parse_from(["ctrmeta", "create", "c1"]).is_err());
    }

    #[test]
    fn test_invalid_label_argument() {
        assert!(parse_label("=value").is_err());
        assert!(parse_label("novalue").is_err());
        assert_eq!(
            parse_label("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
    }
}
