//! Integration tests for CLI functionality
//!
//! These tests verify that configuration loading, store opening and
//! subcommand execution work together. Unit tests for argument parsing and
//! discovery live in the respective module files.

use ctrmeta::cli::{self, Args, Commands, ConfigDiscovery};
use ctrmeta::{Context, MetadataStore, errdefs};
use clap::Parser;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_commands_against_configured_store() {
    let temp_dir = TempDir::new().unwrap();
    let store_root = temp_dir.path().join("store");
    let config_path = temp_dir.path().join("ctrmeta.toml");
    fs::write(
        &config_path,
        format!(
            "root = {:?}\ndefault_namespace = \"ci\"\nsync_writes = false\n",
            store_root.display().to_string()
        ),
    )
    .unwrap();
    let spec_file = temp_dir.path().join("spec.json");
    fs::write(&spec_file, br#"{"ociVersion":"1.1.0"}"#).unwrap();

    let config = ConfigDiscovery::discover_config(Some(&config_path)).unwrap();
    assert_eq!(config.default_namespace, "ci");
    let ctx = Context::new(config.default_namespace.clone());

    let args = Args::try_parse_from([
        "ctrmeta".to_string(),
        "create".to_string(),
        "build-1".to_string(),
        "--runtime".to_string(),
        "io.containerd.runc.v2".to_string(),
        "--spec-type".to_string(),
        "types.test/Spec".to_string(),
        "--spec-file".to_string(),
        spec_file.display().to_string(),
        "--label".to_string(),
        "pipeline=nightly".to_string(),
    ])
    .unwrap();

    {
        let store = MetadataStore::open(&config).await.unwrap();
        assert!(store.is_persistent());
        let created = cli::execute(&store, &ctx, args.command.unwrap())
            .await
            .unwrap();
        assert_eq!(created["labels"]["pipeline"], "nightly");
        assert_eq!(created["spec"]["type_url"], "types.test/Spec");
    }

    let store = MetadataStore::open(&config).await.unwrap();
    let listed = cli::execute(
        &store,
        &ctx,
        Commands::List {
            filters: vec!["labels.pipeline==nightly".to_string()],
        },
    )
    .await
    .unwrap();
    assert_eq!(listed[0]["id"], "build-1");

    let err = cli::execute(
        &store,
        &Context::new("other"),
        Commands::Delete {
            id: "build-1".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(errdefs::is_not_found(&*err));
}

#[tokio::test]
async fn test_update_of_immutable_field_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let spec_file = temp_dir.path().join("spec.json");
    fs::write(&spec_file, b"{}").unwrap();

    let store = MetadataStore::in_memory();
    let ctx = Context::new("default");
    cli::execute(
        &store,
        &ctx,
        Commands::Create {
            id: "web".to_string(),
            runtime: "io.containerd.runc.v2".to_string(),
            spec_type: "types.test/Spec".to_string(),
            spec_file,
            image: None,
            labels: vec![],
            snapshotter: None,
            snapshot_key: None,
            sandbox: None,
        },
    )
    .await
    .unwrap();

    let update = |fields: Vec<String>| Commands::Update {
        id: "web".to_string(),
        image: None,
        labels: vec![],
        snapshot_key: None,
        fields,
    };

    let err = cli::execute(&store, &ctx, update(vec!["runtime".to_string()]))
        .await
        .unwrap_err();
    assert!(errdefs::is_invalid_argument(&*err));

    let err = cli::execute(&store, &ctx, update(vec![]))
        .await
        .unwrap_err();
    assert!(!errdefs::is_invalid_argument(&*err));
    assert!(err.to_string().contains("nothing to update"));
}
